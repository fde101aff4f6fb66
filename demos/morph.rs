//! Morph demo: prints in-between frames as path data and the midpoint frame
//! as DXF.
//!
//! Usage:
//! ```text
//! cargo run --example morph                                   # square → circle
//! cargo run --example morph -- "M0 0h10v10h-10z" "M5 0L10 10L0 10Z" 8
//! ```

use shapemorph::export::{to_dxf, DxfOptions};
use shapemorph::math::Point2;
use shapemorph::{build, AccuracySpec, MorphOptions, PathShape, Result};

fn main() -> Result<()> {
    // Default: WARN for everything, INFO for shapemorph.
    // Override with RUST_LOG env var (e.g. RUST_LOG=shapemorph=debug).
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        .add_directive("shapemorph=info".parse().unwrap_or_default());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let mut args = std::env::args().skip(1);
    let source = match args.next() {
        Some(data) => data.parse()?,
        None => PathShape::rect(Point2::new(0.0, 0.0), 100.0, 100.0),
    };
    let target = match args.next() {
        Some(data) => data.parse()?,
        None => PathShape::circle(Point2::new(200.0, 50.0), 50.0),
    };
    let frames: u32 = args.next().and_then(|n| n.parse().ok()).unwrap_or(10).max(1);

    let options = MorphOptions::default().with_accuracy(AccuracySpec::MaxSegmentLength(5.0));
    let morph = build(&source, &target, &options)?;

    for frame in 0..=frames {
        let t = f64::from(frame) / f64::from(frames);
        println!("{t:.3}\t{}", morph.evaluate_path_data(t));
    }

    print!("{}", to_dxf(&morph.evaluate(0.5), &DxfOptions::default())?);
    Ok(())
}
