// codeshine CLI entry point

use codeshine_cli::{output, router::CommandRouter};

/// Exit code for a run stopped by Ctrl-C
const EXIT_INTERRUPTED: i32 = 130;

#[tokio::main]
async fn main() {
    if let Err(e) = CommandRouter::route().await {
        if e.is_cancelled() {
            output::print_warning(&e.user_message());
            std::process::exit(EXIT_INTERRUPTED);
        }
        output::print_error(&e.user_message());
        std::process::exit(1);
    }
}
