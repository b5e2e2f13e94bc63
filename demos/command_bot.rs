//! Minimal command bot: logs in, connects to the realtime socket, and
//! answers `!ping` in whatever community the message came from.
//!
//! ```bash
//! AMINO_EMAIL=... AMINO_PASSWORD=... cargo run --example command_bot
//! ```

use amino_fast::{AminoError, AminoRestClient, AminoWsClient, EventRouter};

#[tokio::main]
async fn main() -> Result<(), AminoError> {
    let email = std::env::var("AMINO_EMAIL").expect("AMINO_EMAIL not set");
    let password = std::env::var("AMINO_PASSWORD").expect("AMINO_PASSWORD not set");

    let rest = AminoRestClient::new();
    let login = rest.login_with_email(&email, &password).await?;
    println!(
        "logged in as {}",
        login
            .user_profile
            .and_then(|p| p.nickname)
            .unwrap_or_else(|| "<unknown>".into())
    );

    let mut router = EventRouter::new();
    router.command("!ping", |event| async move {
        if let Err(err) = event.reply("pong").await {
            eprintln!("reply failed: {err}");
        }
    });
    router.on_text_message(|event| async move {
        println!("[{}] {}", event.ndc_id, event.content());
    });
    router.on_connection_error(|err| async move {
        eprintln!("realtime error: {err}");
    });

    let ws = AminoWsClient::new(rest);
    let handle = ws.start(router)?;

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| AminoError::Ws(e.to_string()))?;
    handle.stop().await;
    Ok(())
}
