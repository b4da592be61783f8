//! Renders an analog clock face into an RGB565 buffer and saves it as PPM
#![deny(warnings)]

use cellrast::*;
use std::{
    env,
    fs::File,
    io::{BufWriter, Write},
};
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

type Error = Box<dyn std::error::Error>;

#[derive(Debug)]
struct Args {
    output_file: String,
    config: RasterizerConfig,
    size: usize,
    time: (u32, u32, u32),
    fill_rule: FillRule,
}

impl Args {
    fn parse() -> Result<Args, Error> {
        let mut result = Args {
            output_file: String::new(),
            config: RasterizerConfig::default(),
            size: 240,
            time: (10, 9, 36),
            fill_rule: FillRule::NonZero,
        };
        let mut positional = 0;
        let mut args = env::args();
        let cmd = args.next().unwrap_or_else(|| "render".to_owned());
        while let Some(arg) = args.next() {
            match arg.as_ref() {
                "-h" => {
                    positional = 0;
                    break;
                }
                "-c" => {
                    let path = args.next().ok_or("-c requires argument")?;
                    result.config = serde_json::from_reader(File::open(path)?)?;
                }
                "-s" => {
                    let size = args.next().ok_or("-s requires argument")?;
                    result.size = size.parse()?;
                }
                "-t" => {
                    let time = args.next().ok_or("-t requires argument")?;
                    let mut parts = time.split(':').map(|part| part.parse::<u32>());
                    let mut next = || parts.next().unwrap_or(Ok(0));
                    result.time = (next()?, next()?, next()?);
                }
                "-e" => {
                    result.fill_rule = FillRule::EvenOdd;
                }
                _ => {
                    positional += 1;
                    result.output_file = arg;
                }
            }
        }
        if positional != 1 {
            eprintln!("Render clock face into RGB565 buffer and save it as binary PPM");
            eprintln!("\nUSAGE:");
            eprintln!(
                "    {} [-c <config.json>] [-s <size>] [-t <hh:mm:ss>] [-e] <output.ppm>",
                cmd
            );
            eprintln!("\nARGS:");
            eprintln!("    -c <config.json>   rasterizer configuration");
            eprintln!("    -s <size>          width and height of the image");
            eprintln!("    -t <hh:mm:ss>      time shown by the clock");
            eprintln!("    -e                 use even-odd fill rule");
            eprintln!("    <output.ppm>       output file, `-` for stdout");
            std::process::exit(1);
        }
        Ok(result)
    }
}

fn clock(
    rasterizer: &mut Rasterizer,
    renderer: &mut Renderer<'_>,
    size: Scalar,
    (hours, minutes, seconds): (u32, u32, u32),
    fill_rule: FillRule,
) -> Result<(), Error> {
    let center = Point::new(size / 2.0, size / 2.0);
    let radius = size / 2.0 - 4.0;
    let hand = |fraction: Scalar, length: Scalar| {
        let angle = fraction * 2.0 * PI - PI / 2.0;
        center + Point::new(angle.cos() * length, angle.sin() * length)
    };

    rasterizer.ellipse(center, (radius, radius));
    rasterizer.render(renderer, "#202840".parse()?, fill_rule)?;
    rasterizer.thick_ellipse(center, (radius, radius), radius * 0.05);
    rasterizer.render(renderer, "#c0c0c0".parse()?, fill_rule)?;

    for tick in 0..12 {
        let fraction = tick as Scalar / 12.0;
        let width = if tick % 3 == 0 { 3.0 } else { 1.5 };
        rasterizer.thick_line(hand(fraction, radius * 0.78), hand(fraction, radius * 0.9), width);
        rasterizer.render(renderer, Rgba::rgb(255, 255, 255), fill_rule)?;
    }

    let hours = (hours % 12) as Scalar + minutes as Scalar / 60.0;
    let minutes = minutes as Scalar + seconds as Scalar / 60.0;
    rasterizer.pointed_line(center, hand(hours / 12.0, radius * 0.5), radius * 0.08);
    rasterizer.render(renderer, Rgba::rgb(255, 255, 255), fill_rule)?;
    rasterizer.pointed_line(center, hand(minutes / 60.0, radius * 0.75), radius * 0.06);
    rasterizer.render(renderer, Rgba::rgb(255, 255, 255), fill_rule)?;
    rasterizer.thick_line(center, hand(seconds as Scalar / 60.0, radius * 0.85), 1.0);
    rasterizer.render(renderer, Rgba::new(255, 40, 40, 200), fill_rule)?;
    rasterizer.ellipse(center, (radius * 0.04, radius * 0.04));
    rasterizer.render(renderer, Rgba::rgb(255, 40, 40), fill_rule)?;
    Ok(())
}

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_span_events(FmtSpan::CLOSE)
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse()?;
    tracing::debug!("[args] {:?}", args);

    let mut fb = Rgb565Buffer::new(args.size, args.size);
    fb.clear(Rgb565::BLACK);
    let mut rasterizer = Rasterizer::with_config(&args.config);
    tracing::debug_span!("[clock]").in_scope(|| {
        clock(
            &mut rasterizer,
            &mut Renderer::new(&mut fb),
            args.size as Scalar,
            args.time,
            args.fill_rule,
        )
    })?;

    let save = tracing::debug_span!("[save]");
    {
        let _guard = save.enter();
        if args.output_file != "-" {
            let mut image_file = BufWriter::new(File::create(args.output_file)?);
            fb.write_ppm(&mut image_file)?;
            image_file.flush()?;
        } else {
            fb.write_ppm(std::io::stdout().lock())?;
        }
    }
    Ok(())
}
