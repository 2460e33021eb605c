//! Event loop between the host's line protocol and the dashboard

use std::sync::Arc;

use anyhow::{Context, Result};
use hd_views::{
    predict_or_fallback, Dashboard, DashboardEvent, DashboardFrame, Prediction, PredictionRequest, Predictor,
    StaffEvent,
};
use tokio::io::{AsyncBufRead, AsyncWrite, AsyncWriteExt, Lines};
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

type Delivery = (PredictionRequest, Prediction);

/// Parse one input line; blank and malformed lines are skipped
pub fn parse_event(line: &str) -> Option<DashboardEvent> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    match serde_json::from_str(line) {
        Ok(event) => Some(event),
        Err(e) => {
            warn!(error = %e, "skipping malformed event");
            None
        }
    }
}

/// Run each request on the blocking pool; results come back through `tx`
fn spawn_predictions(
    predictor: &Arc<dyn Predictor>,
    requests: &[PredictionRequest],
    tx: &mpsc::UnboundedSender<Delivery>,
) -> usize {
    for request in requests {
        let predictor = predictor.clone();
        let request = request.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let worker = predictor.clone();
            let job = request.clone();
            let prediction = match tokio::task::spawn_blocking(move || predict_or_fallback(worker.as_ref(), &job)).await
            {
                Ok(prediction) => prediction,
                Err(e) => {
                    error!(department = %request.department, error = %e, "prediction task failed");
                    predictor.baseline(request.department)
                }
            };
            if tx.send((request, prediction)).is_err() {
                debug!("session ended before prediction arrived");
            }
        });
    }
    requests.len()
}

async fn write_frame<W: AsyncWrite + Unpin>(out: &mut W, frame: &DashboardFrame) -> Result<()> {
    let mut bytes = serde_json::to_vec(frame).context("failed to encode frame")?;
    bytes.push(b'\n');
    out.write_all(&bytes).await.context("failed to write frame")?;
    out.flush().await.context("failed to flush output")?;
    Ok(())
}

/// Drive the dashboard until input closes and every prediction has landed.
/// Returns the number of frames written.
pub async fn run<R, W>(mut dashboard: Dashboard, mut lines: Lines<R>, mut out: W) -> Result<u64>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<Delivery>();
    let predictor = dashboard.predictor();
    let mut written = 0u64;

    let frame = dashboard.initial_frame();
    let mut in_flight = spawn_predictions(&predictor, &frame.prediction_requests, &tx);
    write_frame(&mut out, &frame).await?;
    written += 1;

    let mut input_open = true;
    loop {
        let frame = tokio::select! {
            line = lines.next_line(), if input_open => {
                match line.context("failed to read event")? {
                    Some(line) => match parse_event(&line) {
                        Some(event) => dashboard.handle(event),
                        None => continue,
                    },
                    None => {
                        input_open = false;
                        continue;
                    }
                }
            }
            Some((request, prediction)) = rx.recv(), if in_flight > 0 => {
                in_flight -= 1;
                dashboard.handle(DashboardEvent::Staff(StaffEvent::PredictionReady { request, prediction }))
            }
            else => break,
        };
        in_flight += spawn_predictions(&predictor, &frame.prediction_requests, &tx);
        write_frame(&mut out, &frame).await?;
        written += 1;
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hd_core::{Row, Service, WeekEvent, FIRST_WEEK, LAST_WEEK};
    use hd_data::{DashboardConfig, Dataset, StaffId, StaffMember, StaffRole, StaffShift};
    use serde_json::Value;
    use tokio::io::{AsyncBufReadExt, BufReader};

    fn row(week: u32, service: Service) -> Row {
        Row {
            week,
            service,
            event: WeekEvent::None,
            beds: 40,
            demand: 38,
            admitted: 36,
            refused: 2,
            satisfaction: 70.0 + (week % 4) as f64,
            morale: 65.0 + (week % 3) as f64,
            pressure_index: 0.95,
            acceptance_rate: 94.7,
            refusal_rate: 5.3,
            utilization_rate: 90.0,
            mean_los: Some(4.0),
        }
    }

    fn dashboard() -> Dashboard {
        let rows = Service::ALL
            .into_iter()
            .flat_map(|s| (FIRST_WEEK..=LAST_WEEK).map(move |w| row(w, s)))
            .collect();
        let staff = ["E1", "E2"]
            .into_iter()
            .map(|id| StaffMember {
                id: StaffId::from(id),
                name: String::new(),
                role: StaffRole::Doctor,
                service: Service::Emergency,
            })
            .collect();
        let schedule = (FIRST_WEEK..=LAST_WEEK)
            .flat_map(|week| {
                ["E1", "E2"].into_iter().map(move |id| StaffShift {
                    week,
                    staff_id: StaffId::from(id),
                    service: Service::Emergency,
                    present: id == "E1" || week % 2 == 0,
                })
            })
            .collect();
        let dataset = Dataset::new("session", rows, staff, schedule).unwrap();
        Dashboard::from_dataset(&dataset, &DashboardConfig::from_data_dir("unused"))
    }

    async fn run_with(input: &str) -> Vec<Value> {
        let mut out = Vec::new();
        let lines = BufReader::new(input.as_bytes()).lines();
        let written = run(dashboard(), lines, &mut out).await.unwrap();
        let frames: Vec<Value> = out
            .split(|b| *b == b'\n')
            .filter(|l| !l.is_empty())
            .map(|l| serde_json::from_slice(l).unwrap())
            .collect();
        assert_eq!(frames.len() as u64, written);
        frames
    }

    #[test]
    fn test_parse_event_skips_noise() {
        assert!(parse_event("   ").is_none());
        assert!(parse_event("{not json").is_none());
        assert!(parse_event(r#"{"type": "reset"}"#).is_some());
    }

    #[tokio::test]
    async fn test_events_produce_frames() {
        let input = concat!(
            r#"{"type": "slider_changed", "payload": {"min": 10, "max": 20}}"#,
            "\n",
            "garbage\n",
            r#"{"view": "overview-chart", "interaction": "relayout_data", "payload": {"xaxis.autorange": true}}"#,
            "\n",
        );
        let frames = run_with(input).await;
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[1]["state"]["range"][0], 10);
        assert_eq!(frames[2]["zoom_indicator"], "Overview (W1-52)");
    }

    #[tokio::test]
    async fn test_prediction_is_delivered_before_exit() {
        let input = concat!(r#"{"type": "toggle_staff", "payload": {"staff_id": "E2"}}"#, "\n");
        let frames = run_with(input).await;
        // initial, toggle, prediction
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[1]["prediction_requests"].as_array().map(Vec::len), Some(1));
        let network = &frames[2]["charts"]["staff-network"];
        assert!(network.is_object());
        assert_ne!(network["body"]["status"], "Pending");
    }
}
