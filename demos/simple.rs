use keyspline::prelude::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut curve = Curve::new();
    curve.add_key(Key::new(Point::new(0.0, 0.0)));
    curve.add_key(Key::new(Point::new(1.0, 1.0)));
    curve.insert_key(
        1,
        Key::with_tangents(
            Point::new(0.5, 0.5),
            Point::new(-0.5, -0.5),
            Point::new(1.0, 5.0),
            TangentMode::Broken,
        ),
    )?;

    if !curve.is_valid() {
        return Err("curve needs at least two keys".into());
    }

    println!("Evaluation by times:");
    for time in [0.0, 0.3, 0.5, 0.6, 1.0] {
        println!("- x={:.2}: y={:.2}", time, curve.evaluate_by_time(time));
    }

    let length = curve.refresh_length();
    let extrems = curve.extrems();
    println!("\nLength: {:.4}", length);
    println!(
        "Extrems: x={:.2}..{:.2} y={:.2}..{:.2}",
        extrems.min_x, extrems.max_x, extrems.min_y, extrems.max_y
    );
    let target = Point::new(0.8, 0.2);
    println!(
        "Nearest point to {}: {}",
        target,
        curve.nearest_point_to(target, NEAREST_STEP)
    );

    let serializer = CurveSerializer::new();
    let data = serializer.serialize(&curve);
    println!("\nCurve serialized data (.{}):\n{}", FORMAT_EXTENSION, data);

    let restored = serializer.unserialize(&data)?;
    println!("Restored {} keys", restored.keys_count());
    Ok(())
}
