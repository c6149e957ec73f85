//! Address command - prints the feed address for a set of credentials.

use feedvault::VaultClient;

use crate::cli::VaultArgs;
use crate::output::OutputFormat;

/// Run the address command
pub async fn run(
    client: &VaultClient,
    args: &VaultArgs,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let address = client.address_for(&args.username, &args.password).await?;
    let topic = client.config().feed_topic()?;

    match format {
        OutputFormat::Human => {
            println!("Address:  {address}");
            println!("Topic:    {topic}");
        }
        OutputFormat::Json => {
            let value = serde_json::json!({
                "address": address.to_hex_prefixed(),
                "topic": topic.to_hex_prefixed(),
            });
            println!("{}", serde_json::to_string(&value)?);
        }
    }
    Ok(())
}
