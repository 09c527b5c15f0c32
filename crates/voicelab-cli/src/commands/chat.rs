use std::io::{BufRead, Write};
use std::sync::Arc;

use anyhow::Result;

use voicelab_application::ChatController;
use voicelab_interaction::GeminiClient;

/// Interactive conversation loop. Reads one line per turn from stdin; an
/// empty line or EOF ends the session.
pub async fn run() -> Result<()> {
    let client = GeminiClient::try_from_env()?;
    let chat = ChatController::new(Arc::new(client));

    for message in chat.messages().await {
        println!("🤖 {}", message.text);
    }

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("you> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next() else { break };
        let line = line?;
        if line.trim().is_empty() {
            break;
        }

        let reply = chat.send_message(&line).await?;
        println!("🤖 {reply}");
    }

    println!("Goodbye.");
    Ok(())
}
