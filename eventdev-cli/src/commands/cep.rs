use anyhow::Result;
use eventdev_core::cep::{CepLookup, ViaCep};
use owo_colors::OwoColorize;

use crate::commands::Context;
use crate::utils::tui::create_spinner;

pub async fn run(ctx: &Context, code: &str) -> Result<()> {
    let viacep = ViaCep::from_config(&ctx.config);

    let spinner = create_spinner(format!("Looking up {}...", code));
    let result = viacep.lookup(code).await;
    spinner.finish_and_clear();
    let address = result?;

    println!("{}", address.cep.bold());
    for (label, value) in [
        ("street", &address.street),
        ("neighborhood", &address.neighborhood),
        ("city", &address.city),
        ("state", &address.state),
    ] {
        if !value.is_empty() {
            println!("  {} {}", format!("{label}:").dimmed(), value);
        }
    }

    Ok(())
}
