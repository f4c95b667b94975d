use omvarldskollen::configuration::get_configuration;
use omvarldskollen::startup::Application;
use omvarldskollen::telemetry::{get_subscriber, initialize_subscriber};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = get_subscriber("omvarldskollen".into(), "info".into(), std::io::stdout);
    initialize_subscriber(subscriber);

    let configuration = get_configuration()?;
    let application = Application::build(configuration)?;
    tracing::info!(port = application.port(), "Omvärldskollen backend listening");
    application.run_until_stopped().await?;
    Ok(())
}
