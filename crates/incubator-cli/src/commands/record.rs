//! Fertility and hatch command implementations.

use anyhow::Result;

use incubator_core::Catalog;
use incubator_types::timestamp;

use crate::context::AppContext;
use crate::style;

pub fn cmd_fertility(ctx: &AppContext, count: u32) -> Result<()> {
    let lifecycle = ctx.lifecycle(Catalog::default())?;
    let record = lifecycle.record_fertility_check(count, ctx.now())?;

    if !ctx.quiet {
        println!(
            "{}",
            style::format_success(
                &format!(
                    "Fertility check recorded: {} of {} eggs fertile",
                    count, record.egg_count
                ),
                ctx.no_color
            )
        );
    }
    Ok(())
}

pub fn cmd_hatch(ctx: &AppContext, count: u32) -> Result<()> {
    let lifecycle = ctx.lifecycle(Catalog::default())?;
    let done = lifecycle.record_hatch(count, ctx.now())?;

    if !ctx.quiet {
        println!(
            "{}",
            style::format_success(
                &format!(
                    "{} of {} {} eggs hatched ({:.1}%)",
                    done.hatched_count,
                    done.egg_count,
                    done.species_name,
                    done.hatch_rate()
                ),
                ctx.no_color
            )
        );
        println!(
            "     Archived on {}; ready for a new incubation",
            timestamp::format(done.ended_at)
        );
    }
    Ok(())
}
