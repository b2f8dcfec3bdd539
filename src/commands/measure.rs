use std::io::{self, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::MeasureArgs;
use crate::model::CommandStatus;
use crate::presentation::{RevealPage, SlideMetrics, SlidePage};

use super::sweep::{activate_slide, session_config, wait_until_ready};

pub fn run(args: MeasureArgs) -> Result<CommandStatus> {
    let indices: Vec<usize> = args.slides.iter().map(|n| *n as usize - 1).collect();

    let mut page = RevealPage::open(&session_config(&args.session, true), &args.session.url)?;
    let measured = measure_slides(
        &mut page,
        &indices,
        Duration::from_millis(args.settle_ms),
        Duration::from_millis(args.session.ready_timeout_ms),
    );
    if let Err(err) = page.close() {
        warn!(error = %err, "failed to close browser session");
    }
    let measured = measured?;

    let mut output = io::BufWriter::new(io::stdout().lock());
    for metrics in &measured {
        serde_json::to_writer_pretty(&mut output, metrics)
            .context("failed to serialize slide metrics")?;
        writeln!(output)?;
    }
    output.flush()?;
    Ok(CommandStatus::Success)
}

pub(crate) fn measure_slides<P: SlidePage + ?Sized>(
    page: &mut P,
    indices: &[usize],
    settle: Duration,
    ready_timeout: Duration,
) -> Result<Vec<SlideMetrics>> {
    wait_until_ready(page, ready_timeout, Duration::from_millis(100))?;

    let mut measured = Vec::with_capacity(indices.len());
    for &index in indices {
        activate_slide(page, index, settle)?;
        let metrics = page.measure(index)?;
        info!(
            slide = metrics.slide,
            overflow = metrics.overflow,
            scale = metrics.scale,
            "measured slide"
        );
        measured.push(metrics);
    }
    Ok(measured)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presentation::SlideSnapshot;
    use crate::presentation::fake::FakeDeck;

    #[test]
    fn measures_requested_slides_in_argument_order() {
        let mut deck = FakeDeck::with_slides(vec![SlideSnapshot::default(); 5]);

        let metrics = measure_slides(
            &mut deck,
            &[3, 0],
            Duration::ZERO,
            Duration::from_millis(100),
        )
        .expect("measure");

        assert_eq!(
            metrics.iter().map(|m| m.slide).collect::<Vec<_>>(),
            vec![4, 1]
        );
        assert_eq!(deck.navigations, vec![3, 0]);
        assert_eq!(deck.measured, vec![3, 0]);
    }

    #[test]
    fn unknown_slide_fails_the_measurement() {
        let mut deck = FakeDeck::with_slides(vec![SlideSnapshot::default(); 2]);

        let err = measure_slides(&mut deck, &[7], Duration::ZERO, Duration::from_millis(100))
            .expect_err("slide 8 does not exist");
        assert!(err.to_string().contains("slide 8 does not exist"));
    }

    #[test]
    fn metrics_serialize_with_camel_case_keys() {
        let mut deck = FakeDeck::with_slides(vec![SlideSnapshot::default()]);
        let metrics = measure_slides(&mut deck, &[0], Duration::ZERO, Duration::from_millis(100))
            .expect("measure");

        let json = serde_json::to_value(&metrics[0]).expect("serialize");
        assert_eq!(json["slide"], 1);
        assert_eq!(json["slideScrollHeight"], 1100.0);
        assert_eq!(json["containerTransform"], "none");
    }
}
