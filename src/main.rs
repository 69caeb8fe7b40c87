use log::debug;
use std::env;
use std::ffi::{OsStr, OsString};
use std::io::{self, BufWriter, Write};
use std::process;

use sqldescribe::{extract, Error, Target, WindowConfig};

/// Print the `CREATE TABLE` statement of the table named on the command line,
/// read from a SQL dump on standard input.
///
/// Table names longer than 64 bytes are truncated.
fn main() {
    env_logger::init();
    let args: Vec<OsString> = env::args_os().collect();
    if args.len() != 2 {
        let program = args
            .first()
            .map(|arg| arg.to_string_lossy().into_owned())
            .unwrap_or_else(|| "sqldescribe".to_owned());
        println!("Usage {program} tablename. < file");
        process::exit(2);
    }
    if let Err(err) = run(&args[1]) {
        eprintln!("Err: {err}");
        process::exit(1);
    }
}

fn run(table: &OsStr) -> Result<(), Error> {
    let target = Target::new(table.as_encoded_bytes())?;
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut output = BufWriter::new(stdout.lock());
    let name = target.to_string();
    let found = extract(stdin.lock(), target, &mut output, WindowConfig::DEFAULT)?;
    output.flush()?;
    if !found {
        debug!("no CREATE TABLE statement for {name}");
    }
    Ok(())
}
