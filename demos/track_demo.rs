//! Feed a synthetic rotation into the tracker and print the event stream

use synheart_somn::pipeline::track_trace;
use synheart_somn::types::{UniformSample, UniformTrace};
use synheart_somn::TrackerConfig;

fn main() {
    // 60 s of a still, raised arm followed by 60 s rotated ~90°
    let samples = (0..1200)
        .map(|i| {
            let (ay, az) = if i < 600 { (0.0, 1.0) } else { (1.0, 0.0) };
            UniformSample {
                t: i as f64 * 0.1,
                ax: 0.0,
                ay,
                az,
                label: 0,
            }
        })
        .collect();
    let trace = UniformTrace { fs: 10, samples };

    let config = TrackerConfig {
        classification_hist_size: 4,
        ..TrackerConfig::default()
    };

    match track_trace(&trace, &config) {
        Ok(events) => {
            for event in events {
                println!("{:6.1}s  {:?}", event.t, event.state);
            }
        }
        Err(e) => eprintln!("Error: {e:?}"),
    }
}
