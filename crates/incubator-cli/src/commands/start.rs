//! Start and push command implementations.

use anyhow::Result;

use incubator_core::lifecycle::format_remaining;
use incubator_types::timestamp;

use crate::context::AppContext;
use crate::style;

pub async fn cmd_start(ctx: &AppContext, species: &str, eggs: u32, notes: &str) -> Result<()> {
    let lifecycle = ctx.lifecycle(ctx.load_catalog())?;
    let now = ctx.now();

    let started = lifecycle.start(species, eggs, notes, now).await?;
    let record = &started.record;

    if !ctx.quiet {
        println!(
            "{}",
            style::format_success(
                &format!(
                    "Started {} {} eggs on {}",
                    record.egg_count,
                    record.species_name,
                    timestamp::format(record.started_at)
                ),
                ctx.no_color
            )
        );
        println!(
            "     Expected hatch: {} ({} to go)",
            timestamp::format(record.expected_end()),
            format_remaining(record.remaining(now))
        );
    }

    report_push(ctx, started.pushed);
    Ok(())
}

pub async fn cmd_push(ctx: &AppContext) -> Result<()> {
    let lifecycle = ctx.lifecycle(ctx.load_catalog())?;
    if !lifecycle.resend_config().await? {
        anyhow::bail!(
            "Controller at {} did not accept the configuration",
            lifecycle.notifier().address()
        );
    }

    report_push(ctx, true);
    Ok(())
}

fn report_push(ctx: &AppContext, pushed: bool) {
    let address = &ctx.config.controller.address;
    if pushed {
        if !ctx.quiet {
            println!(
                "{}",
                style::format_success(
                    &format!("Controller at {} updated", address),
                    ctx.no_color
                )
            );
        }
    } else {
        eprintln!(
            "{}",
            style::format_warning(
                &format!(
                    "Controller at {} could not be updated; run `incubator push` to retry",
                    address
                ),
                ctx.no_color
            )
        );
    }
}
