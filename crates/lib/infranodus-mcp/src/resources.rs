//! Static informational resources.

use std::fmt::Write as _;

use infranodus_core::ToolName;
use rmcp::model::{Annotated, RawResource, Resource, ResourceContents};

pub const ABOUT_URI: &str = "info://about";
const TEXT_PLAIN: &str = "text/plain";

pub fn about_resource() -> Resource {
    Annotated::new(
        RawResource {
            uri: ABOUT_URI.to_string(),
            name: "About InfraNodus MCP Server".to_string(),
            title: None,
            description: Some(
                "Information about this MCP server and InfraNodus capabilities".to_string(),
            ),
            mime_type: Some(TEXT_PLAIN.to_string()),
            size: None,
            icons: None,
            meta: None,
        },
        None,
    )
}

pub fn about_contents() -> ResourceContents {
    ResourceContents::TextResourceContents {
        uri: ABOUT_URI.to_string(),
        mime_type: Some(TEXT_PLAIN.to_string()),
        text: about_text(),
        meta: None,
    }
}

pub fn about_text() -> String {
    let mut text = String::from(
        "InfraNodus MCP Server\n\n\
         This server provides tools for text analysis and knowledge graph generation \
         using the InfraNodus API.\n\nAvailable Tools:\n",
    );
    for (index, tool) in ToolName::ALL.iter().enumerate() {
        let _ = writeln!(text, "{}. {} - {}", index + 1, tool, tool.description());
    }
    text.push_str(
        "\nKey Features:\n\
         - Topic modeling and clustering\n\
         - Content gap detection (finding missing connections)\n\
         - Network statistics (modularity, centrality, etc.)\n\
         - AI-powered topic naming\n\
         - Entity detection for cleaner graphs\n\n\
         Configuration:\n\
         - Requires the INFRANODUS_API_KEY environment variable\n\
         - Get your API key at: https://infranodus.com/api-access\n\n\
         Learn more: https://infranodus.com\n",
    );
    text
}
