use bompricer::cli::{Cli, Commands};
use clap::Parser;
use miette::Result;

fn main() -> Result<()> {
    // Reset SIGPIPE so piping to `head` and friends exits quietly
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }

    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    bompricer::logging::init(global.verbose, global.quiet);

    match cli.command {
        Commands::Gen(args) => bompricer::cli::commands::gen::run(args, &global),
        Commands::Update(args) => bompricer::cli::commands::update::run(args, &global),
        Commands::Catalog(cmd) => bompricer::cli::commands::catalog::run(cmd, &global),
        Commands::Completions(args) => bompricer::cli::commands::completions::run(args),
    }
}
