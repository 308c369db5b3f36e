use flapwatch_core::{DetectorBuilder, Observation};
use flapwatch_monitor::{FlapDetector, FlapEventKind, TracingListener};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    // Ten-tick window, flap start at 0.29, stop at 0.49, threshold 10.
    let config = DetectorBuilder::new()
        .interval(10)
        .start_threshold(0.29)
        .stop_threshold(0.49)
        .weights(1.0, 1.0)
        .default_threshold(10.0)
        .build()?;
    let mut detector = FlapDetector::from_config(config)?;
    let mut console = TracingListener;

    let below = Observation::new("heap_used", 0.0, 0.0);
    let above = Observation::new("heap_used", 0.0, 20.0);

    let mut feed = |obs: &Observation| -> Result<Option<FlapEventKind>, Box<dyn std::error::Error>> {
        Ok(detector.observe_with(obs, &mut console)?)
    };

    for _ in 0..10 {
        feed(&below)?;
    }
    for obs in [&above, &below, &above] {
        if let Some(kind) = feed(obs)? {
            println!("{:<36} high={}", kind.as_str(), obs.high());
        }
    }
    for _ in 0..5 {
        if let Some(kind) = feed(&below)? {
            println!("{:<36} high={}", kind.as_str(), below.high());
        }
    }
    Ok(())
}
