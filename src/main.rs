use futures::StreamExt;

use housing_intake::channels::{Channel, CliChannel, OutgoingResponse};
use housing_intake::config::IntakeConfig;
use housing_intake::intake::{IntakePhase, IntakeRunner, IntakeSession, StepOutcome};
use housing_intake::llm::create_provider;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = IntakeConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        eprintln!("  export OPENAI_API_KEY=sk-... (or ANTHROPIC_API_KEY with HOUSING_INTAKE_BACKEND=anthropic)");
        std::process::exit(1);
    });

    eprintln!("🏠 Housing Intake v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {}", config.llm.model);
    eprintln!("   Tell me about yourself and your housing plans. /quit to exit.\n");

    let llm = create_provider(&config.llm);
    let runner = IntakeRunner::new(llm, &config);
    let mut session = IntakeSession::new();

    let channel = CliChannel::new();
    let mut incoming = channel.start().await?;

    while let Some(msg) = incoming.next().await {
        if msg.content == "/quit" {
            break;
        }

        // One blocking model call per turn; failures end the conversation.
        let outcome = runner.step(&mut session, &msg.content).await?;
        let reply = render_outcome(&session, &outcome);
        channel.respond(&msg, OutgoingResponse::new(reply)).await?;

        if outcome.phase.is_terminal() {
            break;
        }
    }

    channel.shutdown().await?;
    Ok(())
}

/// Turn a step outcome into the next thing to say to the user.
fn render_outcome(session: &IntakeSession, outcome: &StepOutcome) -> String {
    match outcome.phase {
        IntakePhase::Collecting => format!(
            "Still need: {}",
            outcome.missing.join(", ")
        ),
        IntakePhase::Reviewing => format!(
            "Here is what I have:\n{}\n\nAnything to correct? Tell me, or say you're done.",
            session.profile.summary()
        ),
        IntakePhase::Complete => format!(
            "All set. Final record:\n{}",
            session.profile.summary()
        ),
    }
}
