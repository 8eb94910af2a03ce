/*
[INPUT]:  None
[OUTPUT]: API reference and usage summary on stdout
[POS]:    CLI layer - `info` subcommand
[UPDATE]: When the endpoint, envelope constants, or task flags change
*/

use console::style;

use autoglm_adapter::{CLIENT_MSG_TYPE, DEFAULT_ENDPOINT, TASK_BIZ_TYPE};

pub fn print_info() {
    println!("{}", style("AutoGLM API").bold().cyan());
    println!("{}", "=".repeat(50));
    println!("Endpoint:      {}", DEFAULT_ENDPOINT);
    println!("Protocol:      WebSocket (wss)");
    println!("Auth:          Bearer token (Authorization header)");
    println!("Message type:  {}", CLIENT_MSG_TYPE);
    println!("Business type: {}", TASK_BIZ_TYPE);

    println!("\n{}", style("Configuration").bold());
    println!("  --api-key / AUTOGLM_API_KEY / api_key in the settings file");
    println!("  --endpoint / AUTOGLM_ENDPOINT / endpoint in the settings file");
    println!("  autoglm init writes a settings file, load it with --config");

    println!("\n{}", style("Usage").bold());
    println!("  autoglm task \"open maps\"");
    println!("  autoglm task --conversation-id abc123 \"search for a coffee shop\"");
    println!("  autoglm task --no-audit-log --connect-timeout 5 \"go back home\"");
}
