use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use color_eyre::Result;
use tracing::Level;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::fmt::time::OffsetTime;

use crate::args::{CombineArgs, ToolArgs};
use crate::subcommands::{combine, extract, make_dose};
use crate::tools::ExternalTools;

#[derive(Parser, Debug)]
#[command(author, version, about, styles=get_styles())]
pub struct Arguments {
    #[command(subcommand)]
    pub cmd: SubCommand,
}

#[derive(Args, Debug, Clone)]
pub struct LogAndVerbosity {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, default_value_t = 3)]
    pub verbosity: u8,

    /// A file path to save logs to
    #[arg(short, long = "log")]
    pub log_file: Option<PathBuf>,

    /// Silence all warning and info messages
    #[arg(long)]
    pub silent: bool,
}

#[derive(Subcommand, Debug)]
pub enum SubCommand {
    /// Combine per-chromosome dose and info files into single files
    Combine {
        #[command(flatten)]
        args: CombineArgs,

        #[command(flatten)]
        tools: ToolArgs,

        #[command(flatten)]
        log_and_verbosity: LogAndVerbosity,
    },

    /// Extract SNPs by position from per-chromosome dose and info files
    Extract {
        /// File [columns id (format: 'chr:pos'), effect allele, noneffect allele, etc] containing the SNPs to be extracted, no header
        #[arg(long = "snp_list", alias = "snp-list", value_hint = clap::ValueHint::FilePath)]
        snp_list: PathBuf,

        /// Directory of VCF files
        #[arg(long = "vcf_dir", alias = "vcf-dir", value_hint = clap::ValueHint::DirPath)]
        vcf_dir: PathBuf,

        /// Directory to save filtered VCF files
        #[arg(long = "out_dir", alias = "out-dir", value_hint = clap::ValueHint::DirPath)]
        out_dir: PathBuf,

        /// Number of threads (defaults to one per chromosome)
        #[arg(short = 't', long)]
        threads: Option<usize>,

        #[command(flatten)]
        tools: ToolArgs,

        #[command(flatten)]
        log_and_verbosity: LogAndVerbosity,
    },

    /// Combine VCF files and make an annotated dosage table
    MakeDose {
        /// Folder that contains all files
        #[arg(long, value_hint = clap::ValueHint::DirPath)]
        folder: PathBuf,

        /// Name of output file
        #[arg(long, default_value_os_t = PathBuf::from("final_dose.txt"))]
        out: PathBuf,

        /// Directory for the combined intermediate files
        #[arg(long, default_value_os_t = PathBuf::from("./"), value_hint = clap::ValueHint::DirPath)]
        workdir: PathBuf,

        #[command(flatten)]
        tools: ToolArgs,

        #[command(flatten)]
        log_and_verbosity: LogAndVerbosity,
    },
}

impl SubCommand {
    #[rustfmt::skip]
    pub fn log_and_verbosity(&self) -> (u8, &Option<PathBuf>, bool) {
        match self {
            SubCommand::Combine { log_and_verbosity, .. }
            | SubCommand::Extract { log_and_verbosity, .. }
            | SubCommand::MakeDose { log_and_verbosity, .. }
            => (log_and_verbosity.verbosity, &log_and_verbosity.log_file, log_and_verbosity.silent),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SubCommand::Combine { .. } => "Combine VCF",
            SubCommand::Extract { .. } => "SNP extraction",
            SubCommand::MakeDose { .. } => "Making dosages",
        }
    }
}

pub fn run_args(args: Arguments) -> Result<()> {
    let (verbosity, log_file, is_silent) = args.cmd.log_and_verbosity();

    let (level, wrtr, _guard) = init_tracing(verbosity, log_file, is_silent)?;

    let timer = time::format_description::parse("[hour]:[minute]:[second].[subsecond digits:3]")?;
    let time_offset = time::UtcOffset::current_local_offset().unwrap_or(time::UtcOffset::UTC);
    let timer = OffsetTime::new(time_offset, timer);

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(wrtr)
        .with_timer(timer)
        .init();

    let name = args.cmd.name();

    if let Err(e) = run_cmd(args.cmd) {
        tracing::error!("{name} failed: {e:?}");
        return Err(e);
    }

    tracing::info!("Complete");
    Ok(())
}

#[rustfmt::skip]
pub fn run_cmd(cmd: SubCommand) -> Result<()> {
    match cmd {
        SubCommand::Combine { args, tools, .. } => {
            combine::run(&ExternalTools::from(tools), &args)?;
        }
        SubCommand::Extract { snp_list, vcf_dir, out_dir, threads, tools, .. } => {
            extract::run(&ExternalTools::from(tools), &snp_list, &vcf_dir, &out_dir, threads)?;
        }
        SubCommand::MakeDose { folder, out, workdir, tools, .. } => {
            make_dose::run(&ExternalTools::from(tools), &folder, &out, &workdir)?;
        }
    };
    Ok(())
}

pub fn init_tracing(
    verbosity: u8,
    log_file: &Option<PathBuf>,
    is_silent: bool,
) -> Result<(Level, NonBlocking, WorkerGuard)> {
    let level = if is_silent {
        Level::ERROR
    } else {
        match verbosity {
            0 | 1 => Level::ERROR,
            2 => Level::WARN,
            3 => Level::INFO,
            4 => Level::DEBUG,
            5..=u8::MAX => Level::TRACE,
        }
    };

    // Write logs to stderr or file
    let (wrtr, _guard) = match log_file {
        Some(path) => {
            let file = std::fs::File::options()
                .create(true)
                .write(true)
                .truncate(true)
                .open(path)?;
            tracing_appender::non_blocking(file)
        }
        None => tracing_appender::non_blocking(std::io::stderr()),
    };

    Ok((level, wrtr, _guard))
}

pub fn get_styles() -> clap::builder::Styles {
    use anstyle::{AnsiColor, Color, Style};

    let fg = |color: AnsiColor| Style::new().fg_color(Some(Color::Ansi(color)));

    clap::builder::Styles::styled()
        .usage(fg(AnsiColor::Yellow).bold().underline())
        .header(fg(AnsiColor::Yellow).bold().underline())
        .literal(fg(AnsiColor::Green))
        .invalid(fg(AnsiColor::Red).bold())
        .error(fg(AnsiColor::Red).bold())
        .valid(fg(AnsiColor::Green).bold().underline())
        .placeholder(fg(AnsiColor::White))
}
