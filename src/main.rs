extern crate sdl2;

use fireworks::{
    burst::random_burst_color,
    counter::Elapsed,
    gift::{from_unix, GiftLock, GiftModal, GiftOutcome, ModalState},
    ConfigError, EngineError, FireworksConfig, FireworksEngine, FrameQueue,
};
use log::{debug, info, LevelFilter};
use log4rs::{
    append::console::ConsoleAppender,
    config::{Appender, Config, Root},
    encode::pattern::PatternEncoder,
};
use nalgebra::Vector2;
use sdl2::event::{Event, WindowEvent};
use sdl2::keyboard::Keycode;
use sdl2::pixels::{Color, PixelFormatEnum};
use sdl2::rect::Rect;
use sdl2::render::{Texture, WindowCanvas};
use std::time::{Duration, Instant, SystemTime};
use thiserror::Error;

// Only used when vsync is off.
const FRAME_TIME_CAP: Duration = Duration::from_millis(16);
const TITLE_REFRESH: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
enum HostError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("logging setup failed: {0}")]
    Logging(String),
    #[error("SDL: {0}")]
    Sdl(String),
}

fn sdl<E: ToString>(err: E) -> HostError {
    HostError::Sdl(err.to_string())
}

fn init_logging(level: LevelFilter) -> Result<(), HostError> {
    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%H:%M:%S%.3f)} {l} {t} - {m}{n}",
        )))
        .build();
    let config = Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .build(Root::builder().appender("stdout").build(level))
        .map_err(|err| HostError::Logging(err.to_string()))?;
    log4rs::init_config(config).map_err(|err| HostError::Logging(err.to_string()))?;
    Ok(())
}

fn draw(
    canvas: &mut WindowCanvas,
    texture: &mut Texture,
    engine: &FireworksEngine,
    state: ModalState,
) -> Result<(), HostError> {
    canvas.set_draw_color(Color::RGB(0, 0, 0));
    canvas.clear();
    let (width, height) = canvas.output_size().map_err(sdl)?;
    match state {
        ModalState::Fireworks => {
            let surface = engine.canvas();
            texture
                .with_lock(None, |buffer: &mut [u8], pitch: usize| {
                    surface.write_rgb24(buffer, pitch)
                })
                .map_err(sdl)?;
            canvas.copy(texture, None, None).map_err(sdl)?;
        }
        ModalState::Postcard => {
            canvas.set_draw_color(Color::RGB(250, 240, 230));
            canvas
                .fill_rect(Rect::new(
                    (width / 4) as i32,
                    (height / 4) as i32,
                    (width / 2).max(1),
                    (height / 2).max(1),
                ))
                .map_err(sdl)?;
        }
        ModalState::Hidden => {
            let side = (width.min(height) / 6).max(1);
            canvas.set_draw_color(Color::RGB(255, 107, 157));
            canvas
                .fill_rect(Rect::new(
                    (width.saturating_sub(side) / 2) as i32,
                    (height.saturating_sub(side) / 2) as i32,
                    side,
                    side,
                ))
                .map_err(sdl)?;
        }
    }
    Ok(())
}

fn run(config: FireworksConfig) -> Result<(), HostError> {
    let sdl_context = sdl2::init().map_err(sdl)?;
    let video_subsystem = sdl_context.video().map_err(sdl)?;
    let window = video_subsystem
        .window(
            &config.display.title,
            config.display.width,
            config.display.height,
        )
        .position_centered()
        .resizable()
        .build()
        .map_err(sdl)?;
    let mut builder = window.into_canvas();
    if config.display.vsync {
        builder = builder.present_vsync();
    }
    let mut canvas = builder.build().map_err(sdl)?;
    let texture_creator = canvas.texture_creator();

    let (width, height) = canvas.output_size().map_err(sdl)?;
    let mut texture = texture_creator
        .create_texture_streaming(PixelFormatEnum::RGB24, width, height)
        .map_err(sdl)?;
    let mut engine = FireworksEngine::new(config.simulation, width, height)?;
    let mut frames = FrameQueue::new();
    let mut modal = GiftModal::new(GiftLock::new(from_unix(config.gift.unlock_at)));
    let together_since = from_unix(config.gift.together_since);
    let mut rng = rand::thread_rng();
    let mut last_title: Option<Instant> = None;

    let mut event_pump = sdl_context.event_pump().map_err(sdl)?;
    'running: loop {
        let frame_start = Instant::now();
        for event in event_pump.poll_iter() {
            match event {
                Event::Quit { .. } => break 'running,
                Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => {
                    if modal.state() == ModalState::Hidden {
                        break 'running;
                    }
                    modal.close(&mut engine, &mut frames);
                }
                Event::KeyDown {
                    keycode: Some(Keycode::Return),
                    ..
                }
                | Event::KeyDown {
                    keycode: Some(Keycode::Space),
                    ..
                } => match modal.state() {
                    ModalState::Hidden => {
                        if let GiftOutcome::Locked { days_remaining } =
                            modal.open(SystemTime::now())
                        {
                            info!(
                                "Not yet! The surprise opens in {} day(s)",
                                days_remaining
                            );
                        }
                    }
                    ModalState::Postcard => {
                        modal.flip(&mut engine, &mut frames);
                    }
                    ModalState::Fireworks => {}
                },
                Event::MouseButtonDown { x, y, .. } if modal.state() == ModalState::Fireworks => {
                    engine.launch_burst(
                        Vector2::new(x as f64, y as f64),
                        random_burst_color(&mut rng),
                    );
                }
                Event::Window {
                    win_event: WindowEvent::SizeChanged(..),
                    ..
                } => {
                    let (width, height) = canvas.output_size().map_err(sdl)?;
                    engine.resize(width, height);
                    if width > 0 && height > 0 {
                        texture = texture_creator
                            .create_texture_streaming(PixelFormatEnum::RGB24, width, height)
                            .map_err(sdl)?;
                    }
                }
                _ => {}
            }
        }

        for handle in frames.take_due() {
            engine.on_frame(handle, &mut frames);
        }

        draw(&mut canvas, &mut texture, &engine, modal.state())?;
        canvas.present();

        if last_title.map_or(true, |at| at.elapsed() >= TITLE_REFRESH) {
            let elapsed = Elapsed::between(together_since, SystemTime::now());
            canvas
                .window_mut()
                .set_title(&format!("{} - {}", config.display.title, elapsed))
                .map_err(sdl)?;
            last_title = Some(Instant::now());
        }

        if !config.display.vsync {
            let frame_time = frame_start.elapsed();
            debug!("Frame time: {:?}", frame_time);
            if frame_time < FRAME_TIME_CAP {
                std::thread::sleep(FRAME_TIME_CAP - frame_time);
            }
        }
    }
    engine.stop(&mut frames);
    Ok(())
}

fn start() -> Result<(), HostError> {
    let config = FireworksConfig::load_default()?;
    init_logging(config.log_level_filter()?)?;
    info!(
        "Opening {}x{} window",
        config.display.width, config.display.height
    );
    run(config)
}

pub fn main() {
    if let Err(err) = start() {
        eprintln!("fireworks: {}", err);
        std::process::exit(1);
    }
}
