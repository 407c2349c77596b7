use clap::{Arg, ArgAction, Command};

pub fn arg_parser() -> Command {
    Command::new("libris")
        .about("Book catalog backed by Open Library")
        .subcommand_required(true)
        .subcommand(
            Command::new("search")
                .about("Search the upstream catalog")
                .arg(Arg::new("query").required(true).num_args(1..))
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print results as JSON"),
                ),
        )
        .subcommand(
            Command::new("resolve")
                .about("Resolve an Open Library work (OL…W) or edition (OL…M) id")
                .arg(Arg::new("identifier").required(true)),
        )
        .subcommand(
            Command::new("import")
                .about("Resolve an Open Library id and store it in the local catalog")
                .arg(Arg::new("identifier").required(true)),
        )
        .subcommand(Command::new("serve").about("Serve the HTTP API"))
        .subcommand(Command::new("export").about("Write the local catalog as CSV to stdout"))
        .subcommand(Command::new("config").about("Print the default configuration"))
}
