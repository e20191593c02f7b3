// Some APIs (burst overrides, buffer accessors) are exercised only by tests
#![allow(dead_code)]

mod canvas;
mod config;
mod display;
mod effects;
mod noise;
mod util;

use config::PaintConfig;
use display::{Display, InputEvent, PixelBuffer, RenderTarget, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use effects::{Blueprint, Datamosh, Effect};
use sdl2::keyboard::Keycode;
use util::FpsCounter;

const CONFIG_PATH: &str = "backdrop.json";

struct Options {
    width: u32,
    height: u32,
    vsync: bool,
    config_path: Option<String>,
    overrides: Vec<(String, String)>,
    reduced_motion: bool,
}

/// Parse command line arguments
fn parse_args() -> Options {
    let args: Vec<String> = std::env::args().collect();
    let mut opts = Options {
        width: DEFAULT_WIDTH,
        height: DEFAULT_HEIGHT,
        vsync: true,
        config_path: None,
        overrides: Vec::new(),
        reduced_motion: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--no-vsync" => opts.vsync = false,
            "--reduced-motion" => opts.reduced_motion = true,
            "--width" | "-w" => {
                if i + 1 < args.len() {
                    if let Ok(w) = args[i + 1].parse::<u32>() {
                        opts.width = w;
                    }
                    i += 1;
                }
            },
            "--height" | "-h" => {
                if i + 1 < args.len() {
                    if let Ok(h) = args[i + 1].parse::<u32>() {
                        opts.height = h;
                    }
                    i += 1;
                }
            },
            "--resolution" | "-r" => {
                if i + 1 < args.len() {
                    // Parse WxH format (e.g., 1920x1080)
                    let parts: Vec<&str> = args[i + 1].split('x').collect();
                    if parts.len() == 2 {
                        if let (Ok(w), Ok(h)) = (parts[0].parse::<u32>(), parts[1].parse::<u32>()) {
                            opts.width = w;
                            opts.height = h;
                        }
                    }
                    i += 1;
                }
            },
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    opts.config_path = Some(args[i + 1].clone());
                    i += 1;
                }
            },
            "--set" => {
                if i + 1 < args.len() {
                    if let Some((key, value)) = args[i + 1].split_once('=') {
                        opts.overrides.push((key.to_string(), value.to_string()));
                    } else {
                        eprintln!("--set expects key=value, got '{}'", args[i + 1]);
                    }
                    i += 1;
                }
            },
            "--help" => {
                println!("Usage: backdrop [OPTIONS]");
                println!();
                println!("Options:");
                println!(
                    "  --width W, -w W       Set window width (default: {})",
                    DEFAULT_WIDTH
                );
                println!(
                    "  --height H, -h H      Set window height (default: {})",
                    DEFAULT_HEIGHT
                );
                println!("  --resolution WxH, -r WxH  Set resolution (e.g., 1920x1080)");
                println!("  --config PATH, -c PATH    Blueprint config file (default: {})", CONFIG_PATH);
                println!("  --set key=value           Override a blueprint parameter (repeatable)");
                println!("  --reduced-motion          Disable the datamosh animation");
                println!("  --no-vsync                Disable VSync for uncapped framerate");
                println!("  --help                    Show this help message");
                std::process::exit(0);
            },
            _ => {},
        }
        i += 1;
    }

    opts
}

/// Reduced-motion preference: the CLI flag or the environment variable
fn reduced_motion_requested(opts: &Options) -> bool {
    if opts.reduced_motion {
        return true;
    }
    matches!(
        std::env::var("BACKDROP_REDUCED_MOTION").as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

fn load_config(opts: &Options) -> PaintConfig {
    match &opts.config_path {
        Some(path) => PaintConfig::load(path).unwrap_or_else(|e| {
            eprintln!("Failed to load {}: {} (using defaults)", path, e);
            PaintConfig::default()
        }),
        // Default path is optional; missing file is the normal case
        None => PaintConfig::load(CONFIG_PATH).unwrap_or_default(),
    }
}

fn main() -> Result<(), String> {
    let opts = parse_args();
    let reduced_motion = reduced_motion_requested(&opts);

    let mut paint_config = load_config(&opts);
    for (key, value) in &opts.overrides {
        if let Err(e) = paint_config.set(key, value) {
            eprintln!("{}", e);
        }
    }

    let (width, height) = (opts.width, opts.height);
    let (mut display, texture_creator) =
        Display::with_options("backdrop", width, height, opts.vsync)?;
    let mut target = RenderTarget::with_size(&texture_creator, width, height)?;
    let mut buffer = PixelBuffer::with_size(width, height);

    // FPS counter with 60 sample rolling average
    let mut fps_counter = FpsCounter::new(60);
    let mut show_fps = false;

    let mut effects: Vec<Box<dyn Effect>> = vec![
        Box::new(Blueprint::new(paint_config.clone())), // 1
        Box::new(Datamosh::new(!reduced_motion)),       // 2
    ];
    let mut current: usize = 0;

    println!("=== backdrop ===");
    println!("Resolution: {}x{}", width, height);
    if opts.vsync {
        println!("VSync: ON (60fps locked). Use --no-vsync for uncapped.");
    } else {
        println!("VSync: OFF (uncapped framerate)");
    }
    if reduced_motion {
        println!("Reduced motion: datamosh shows its static gradient only.");
    }
    println!("Use --help for command line options.");
    println!("Controls:");
    println!("  1          - Blueprint");
    println!("  2          - Datamosh");
    println!("  Left/Right - Cycle through effects");
    println!("  F          - Toggle FPS in window title");
    println!("  S          - Save blueprint config to {}", CONFIG_PATH);
    println!("  Escape     - Quit");

    'main: loop {
        let (dt, avg_fps) = fps_counter.tick();

        for event in display.poll_events() {
            match event {
                InputEvent::Quit => break 'main,
                InputEvent::KeyDown(key) => match key {
                    Keycode::Escape => break 'main,
                    Keycode::Num1 => current = 0,
                    Keycode::Num2 => current = 1,
                    Keycode::Left => {
                        current = if current == 0 { effects.len() - 1 } else { current - 1 };
                    },
                    Keycode::Right => {
                        current = (current + 1) % effects.len();
                    },
                    Keycode::F => show_fps = !show_fps,
                    Keycode::S => {
                        if let Err(e) = paint_config.save(CONFIG_PATH) {
                            eprintln!("Failed to save: {}", e);
                        } else {
                            println!("Config saved to {}", CONFIG_PATH);
                        }
                    },
                    _ => {},
                },
            }
        }

        effects[current].update(dt, width, height);
        effects[current].render(&mut buffer);

        if show_fps {
            let ms = fps_counter.avg_frame_time_ms();
            display.set_title(&format!(
                "backdrop - {} - {} fps ({:.1}ms)",
                effects[current].name(),
                avg_fps as u32,
                ms
            ));
        } else {
            display.set_title(&format!("backdrop - {}", effects[current].name()));
        }

        display.present(&mut target, &buffer)?;
    }

    Ok(())
}
