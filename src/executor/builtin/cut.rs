use std::io::{self, BufRead, Write};
use argh::FromArgs;
use crate::ast::Command;
use crate::config::Config;
use super::manager::{parse_args, BuiltinStatus};

#[derive(FromArgs)]
/// Print selected fields of each line of standard input.
struct CutArgs {
    #[argh(option, short = 'd')]
    /// single-character field delimiter, TAB by default.
    delimiter: Option<String>,
    #[argh(option, short = 'f')]
    /// comma separated list of 1-based field numbers.
    fields: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CutOptions {
    pub delimiter: char,
    pub fields: Vec<usize>,
}

/// `"1,3,10"` -> `[1, 3, 10]`. Entries that are not positive numbers are dropped.
pub fn parse_field_list(list: &str) -> Vec<usize> {
    list.split(',')
        .filter_map(|f| f.trim().parse::<usize>().ok())
        .filter(|&f| f > 0)
        .collect()
}

/// Fields are runs between delimiters; empty runs do not count.
pub fn cut_line(line: &str, opts: &CutOptions) -> String {
    let tokens: Vec<&str> = line.split(opts.delimiter).filter(|t| !t.is_empty()).collect();
    let picked: Vec<&str> = opts
        .fields
        .iter()
        .map(|&want| want.checked_sub(1).and_then(|i| tokens.get(i)).copied().unwrap_or(""))
        .collect();
    picked.join(&opts.delimiter.to_string())
}

pub fn run_cut<R: BufRead, W: Write>(opts: &CutOptions, input: R, mut output: W) -> io::Result<()> {
    for line in input.lines() {
        let line = line?;
        writeln!(output, "{}", cut_line(&line, opts))?;
    }
    output.flush()
}

pub fn cut(cmd: &Command, config: &Config) -> BuiltinStatus {
    let args: CutArgs = match parse_args(cmd) {
        Ok(args) => args,
        Err(status) => return status,
    };

    let delimiter = match args.delimiter.as_deref().map(|d| d.chars().next()) {
        None => '\t',
        Some(Some(c)) => c,
        Some(None) => {
            eprintln!("-{}: cut: empty delimiter", config.sysname);
            return BuiltinStatus::Failure;
        }
    };
    let Some(list) = args.fields else {
        eprintln!("-{}: cut: missing -f/--fields option", config.sysname);
        return BuiltinStatus::Failure;
    };
    let fields = parse_field_list(&list);
    if fields.is_empty() {
        eprintln!("-{}: cut: invalid fields list", config.sysname);
        return BuiltinStatus::Failure;
    }

    let opts = CutOptions { delimiter, fields };
    match run_cut(&opts, io::stdin().lock(), io::stdout().lock()) {
        Ok(()) => BuiltinStatus::Success,
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => BuiltinStatus::Success,
        Err(e) => {
            eprintln!("-{}: cut: {}", config.sysname, e);
            BuiltinStatus::Failure
        }
    }
}
