use std::env;
use std::fs::File;
use std::io::{self, BufWriter, Write};

use sqldescribe::{extract, Target, WindowConfig};

/// Print the `CREATE TABLE` statement of a table from each specified dump.
// RUST_LOG=matcher=debug
fn main() {
    env_logger::init();
    let mut args = env::args().skip(1);
    let Some(table) = args.next() else {
        eprintln!("Usage: describe_files tablename dump.sql...");
        return;
    };
    let target = match Target::new(table.as_bytes()) {
        Ok(target) => target,
        Err(err) => {
            eprintln!("Err: {err}");
            return;
        }
    };
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for arg in args {
        let f = match File::open(&arg) {
            Ok(f) => f,
            Err(err) => {
                eprintln!("Err: {err} in {arg}");
                continue;
            }
        };
        match extract(f, target.clone(), &mut out, WindowConfig::DEFAULT) {
            Ok(true) => {}
            Ok(false) => eprintln!("{table} not found in {arg}"),
            Err(err) => eprintln!("Err: {err} in {arg}"),
        }
    }
    if let Err(err) = out.flush() {
        eprintln!("Err: {err}");
    }
}
