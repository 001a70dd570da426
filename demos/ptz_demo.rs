use axis_ptz_rs::{Capture, PTZ, PTZCam, Resolution};
use std::path::Path;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 4 {
        println!("Usage: {} <IP> <Username> <Password> [Resolution]", args[0]);
        return Ok(());
    }

    let resolution = match args.get(4) {
        Some(res) => res.parse()?,
        None => Resolution::P1080,
    };

    let (mut cam, ping) = PTZCam::new(&args[1], &args[2], &args[3])
        .with_resolution(resolution)
        .open()
        .await;
    if let Some(ping) = ping {
        println!("Ping: {}", ping.trim());
    }

    // Snapshot before moving
    let before = cam.save_frame(Path::new(".")).await?;
    println!("Saved {}", before.display());

    cam.query_position().await?;
    for (param, value) in cam.parameters().iter() {
        println!("  {} = {}", param.as_ref(), value);
    }

    println!("Moving pan/tilt by (+10, +10)...");
    cam.move_pan_tilt(10.0, 10.0).await?;

    let after = cam.save_frame(Path::new(".")).await?;
    println!("Saved {}", after.display());

    Ok(())
}
