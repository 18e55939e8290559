// brine: REPL and script runner for the embedded command language

use std::cell::Cell;
use std::env;
use std::fs;
use std::io::{self, Write};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

use brine::{EvalResult, Interp};

fn main() {
    let args: Vec<String> = env::args().collect();
    let mut interp = Interp::new();
    register_host_commands(&mut interp);

    match args.len() {
        1 => repl(&mut interp),
        2 => run_file(&mut interp, &args[1]),
        _ => {
            let program = args.first().map(String::as_str).unwrap_or("brine");
            eprintln!("usage: {} [script]", program);
            std::process::exit(2);
        }
    }
}

/// Line-oriented interactive loop. Non-empty results are echoed with their
/// return code. Stdin is locked per read so `gets` can share it.
fn repl(interp: &mut Interp) {
    loop {
        print!("brine> ");
        if io::stdout().flush().is_err() {
            return;
        }
        let mut line = String::new();
        match io::stdin().read_line(&mut line) {
            Ok(0) => return,
            Ok(_) => {}
            Err(e) => {
                eprintln!("read error: {}", e);
                return;
            }
        }
        let code = interp.eval_code(&line);
        if !interp.result().is_empty() {
            println!("[{}] {}", code, interp.result());
        }
    }
}

/// Evaluate a whole script file; failures print the diagnostic and exit
/// nonzero.
fn run_file(interp: &mut Interp, path: &str) {
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("failed to open file {}: {}", path, e);
            std::process::exit(1);
        }
    };
    if interp.eval(&source).is_err() {
        eprintln!("error at line {}: {}", interp.line(), interp.result());
        std::process::exit(1);
    }
}

/// Host bindings: the I/O and OS commands the library deliberately does not
/// provide. State (like the PRNG) lives in the command closures.
fn register_host_commands(interp: &mut Interp) {
    must(interp.register_command("puts", |i, argv| {
        if argv.len() != 2 {
            return i.arity_error(2, argv);
        }
        println!("{}", argv[1]);
        i.set_result("");
        Ok(())
    }));

    must(interp.register_command("gets", |i, argv| {
        if argv.len() != 1 {
            return i.arity_error(1, argv);
        }
        let mut line = String::new();
        match io::stdin().read_line(&mut line) {
            Ok(_) => {
                while line.ends_with('\n') || line.ends_with('\r') {
                    line.pop();
                }
                i.set_result(line);
                Ok(())
            }
            Err(e) => i.set_error(format!("gets: {}", e)),
        }
    }));

    must(interp.register_command("getenv", |i, argv| {
        if argv.len() != 2 {
            return i.arity_error(2, argv);
        }
        i.set_result(env::var(&argv[1]).unwrap_or_default());
        Ok(())
    }));

    must(interp.register_command("system", |i, argv| {
        if argv.len() != 2 {
            return i.arity_error(2, argv);
        }
        match Command::new("sh").arg("-c").arg(&argv[1]).status() {
            Ok(status) => {
                i.set_result_integer(i64::from(status.code().unwrap_or(-1)));
                Ok(())
            }
            Err(e) => i.set_error(format!("system: {}", e)),
        }
    }));

    must(interp.register_command("exit", |i, argv| {
        if argv.len() > 2 {
            return i.arity_error(2, argv);
        }
        let code = argv
            .get(1)
            .and_then(|word| word.parse::<i32>().ok())
            .unwrap_or(0);
        std::process::exit(code);
    }));

    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0x9e37_79b9_7f4a_7c15);
    let state = Cell::new(seed | 1);
    must(interp.register_command("rand", move |i, argv| {
        if argv.len() != 1 {
            return i.arity_error(1, argv);
        }
        // xorshift64
        let mut x = state.get();
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        state.set(x);
        i.set_result_integer((x >> 1) as i64);
        Ok(())
    }));

    must(interp.register_command("strftime", |i, argv| {
        if argv.len() != 2 {
            return i.arity_error(2, argv);
        }
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(now) => {
                i.set_result(format_utc(&argv[1], now.as_secs()));
                Ok(())
            }
            Err(e) => i.set_error(format!("strftime: {}", e)),
        }
    }));
}

const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

fn is_leap_year(year: i64) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Civil date from days since the Unix epoch (Howard Hinnant's algorithm).
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}

/// Format a UTC timestamp with a subset of the C `strftime` specifiers:
/// `%Y %m %d %H %M %S %j %a %b %s %%`. Unrecognized specifiers pass
/// through verbatim.
fn format_utc(format: &str, secs: u64) -> String {
    const CUMULATIVE: [u32; 12] = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];
    let days = (secs / 86_400) as i64;
    let tod = secs % 86_400;
    let (year, month, day) = civil_from_days(days);
    let hour = tod / 3_600;
    let minute = tod % 3_600 / 60;
    let second = tod % 60;
    // The epoch fell on a Thursday.
    let weekday = ((days + 4) % 7) as usize;
    let yday =
        CUMULATIVE[(month - 1) as usize] + day + u32::from(month > 2 && is_leap_year(year));

    let mut out = String::with_capacity(format.len());
    let mut chars = format.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('Y') => out.push_str(&year.to_string()),
            Some('m') => out.push_str(&format!("{:02}", month)),
            Some('d') => out.push_str(&format!("{:02}", day)),
            Some('H') => out.push_str(&format!("{:02}", hour)),
            Some('M') => out.push_str(&format!("{:02}", minute)),
            Some('S') => out.push_str(&format!("{:02}", second)),
            Some('j') => out.push_str(&format!("{:03}", yday)),
            Some('a') => out.push_str(WEEKDAYS[weekday]),
            Some('b') => out.push_str(MONTHS[(month - 1) as usize]),
            Some('s') => out.push_str(&secs.to_string()),
            Some('%') => out.push('%'),
            Some(other) => {
                out.push('%');
                out.push(other);
            }
            None => out.push('%'),
        }
    }
    out
}

fn must(result: EvalResult) {
    if result.is_err() {
        eprintln!("internal error: host command registration failed");
        std::process::exit(1);
    }
}
