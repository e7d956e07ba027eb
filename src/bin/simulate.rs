//! Synthetic end-to-end run: calibrate both baseline phases on an
//! alpha-like signal, then stream alternating strong and weak alpha and
//! log the emitted metric events.
//!
//! `RUST_LOG=info cargo run --bin simulate`

use std::f32::consts::PI;

use anyhow::Result;
use log::info;
use rand::Rng;

use alphaband::{
    AlphaConfig, AlphaPipeline, BaselinePhase, ChannelFrame, MetricEvent, SampleRecorder,
};

const FS: f32 = 256.0;
const CHUNK_SEC: f32 = 0.5;
const ALPHA_HZ: f32 = 10.0;

struct StreamClock {
    sample: u64,
}

impl StreamClock {
    fn now(&self) -> f64 {
        self.sample as f64 / FS as f64
    }
}

fn synth_chunk(rng: &mut impl Rng, start: u64, amplitude: f32, noise: f32) -> Vec<f32> {
    let n = (CHUNK_SEC * FS) as usize;
    (0..n)
        .map(|i| {
            let t = (start + i as u64) as f32 / FS;
            amplitude * (2.0 * PI * ALPHA_HZ * t).sin() + noise * rng.gen_range(-1.0..1.0)
        })
        .collect()
}

fn stream(
    pipeline: &mut AlphaPipeline,
    rng: &mut impl Rng,
    clock: &mut StreamClock,
    recorder: Option<&mut SampleRecorder>,
    seconds: f32,
    amplitude: f32,
    noise: f32,
) -> Result<()> {
    let mut recorder = recorder;
    for _ in 0..(seconds / CHUNK_SEC) as usize {
        let values = synth_chunk(rng, clock.sample, amplitude, noise);
        if let Some(recorder) = recorder.as_deref_mut() {
            for (i, &value) in values.iter().enumerate() {
                recorder.write_row(clock.now() + i as f64 / FS as f64, &[value])?;
            }
        }
        clock.sample += values.len() as u64;
        let timestamp = clock.now();
        let frame = ChannelFrame::single_channel(values, Some(timestamp));
        if let Some(result) = pipeline.push(&frame, Some(timestamp))? {
            let event = MetricEvent::new(&result, timestamp);
            info!("{}", event.to_json()?);
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let mut cfg = AlphaConfig::new(FS);
    // short phases so the demo calibrates in seconds instead of minutes
    cfg.baseline_phase_sec = 10.0;
    let mut pipeline = AlphaPipeline::new(cfg, 1)?;
    let mut rng = rand::thread_rng();
    let mut clock = StreamClock { sample: 0 };

    info!("calibrating: eyes closed");
    pipeline.begin_baseline_phase(BaselinePhase::EyesClosed);
    stream(&mut pipeline, &mut rng, &mut clock, None, 10.0, 50.0, 10.0)?;

    info!("calibrating: eyes open");
    pipeline.begin_baseline_phase(BaselinePhase::EyesOpen);
    stream(&mut pipeline, &mut rng, &mut clock, None, 10.0, 20.0, 30.0)?;

    let stats = pipeline
        .end_baseline()
        .ok_or_else(|| anyhow::anyhow!("baseline unavailable after both phases"))?;
    info!(
        "baseline ready: mean={:.4} std={:.4} p50={:.4} p60={:.4} p70={:.4}",
        stats.mean, stats.std, stats.p50, stats.p60, stats.p70
    );

    let record_path = std::env::temp_dir().join("alphaband_demo_stream.csv");
    let mut recorder = SampleRecorder::create(&record_path, 1)?;
    for block in 0..6 {
        let amplitude = if block % 2 == 0 { 60.0 } else { 15.0 };
        stream(
            &mut pipeline,
            &mut rng,
            &mut clock,
            Some(&mut recorder),
            5.0,
            amplitude,
            10.0,
        )?;
    }
    info!(
        "raw stream recorded to {} ({} rows)",
        record_path.display(),
        recorder.rows_written()
    );
    recorder.finish()?;
    Ok(())
}
