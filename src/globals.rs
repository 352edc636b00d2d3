//! The global environment: built-in constants and the native-function
//! bridge (console and stdin I/O, shell execution, and the math, string,
//! time, and file utility namespaces).

use std::cell::RefCell;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::rc::Rc;

use chrono::Local;
use log::debug;
use rand::Rng;

use crate::environment::Environment;
use crate::error::{KinError, Result};
use crate::value::{KinObject, NativeFunction, Value};

/// Build the root scope every program runs under. `file_path` is the script
/// being executed (empty for the REPL); it is exposed to programs as the
/// constant `inzira_ya_dosiye` and anchors relative paths in the file
/// utilities.
pub fn create_global_env(file_path: &str) -> Result<Rc<RefCell<Environment>>> {
    let env: Rc<RefCell<Environment>> = Rc::new(RefCell::new(Environment::new()));

    {
        let mut scope = env.borrow_mut();

        scope.declare("nibyo", Value::Bool(true), true)?;
        scope.declare("sibyo", Value::Bool(false), true)?;
        scope.declare("ubusa", Value::Null, true)?;

        // Mutable by design: programs store their last error here.
        scope.declare("ikosa", Value::Null, false)?;

        scope.declare(
            "inzira_ya_dosiye",
            Value::String(file_path.to_string()),
            true,
        )?;

        scope.declare(
            "tangaza_amakuru",
            native("tangaza_amakuru", print_values),
            true,
        )?;

        scope.declare(
            "injiza_amakuru",
            native("injiza_amakuru", read_input),
            true,
        )?;

        scope.declare("sisitemu", native("sisitemu", run_shell), true)?;

        scope.declare("KIN_IMIBARE", math_namespace(), true)?;
        scope.declare("KIN_AMAGAMBO", string_namespace(), true)?;
        scope.declare("KIN_IGIHE", time_namespace(), true)?;
        scope.declare("KIN_DOSIYE", file_namespace(), true)?;
    }

    debug!("Global environment created for '{}'", file_path);

    Ok(env)
}

fn native(name: &'static str, func: crate::value::NativeFn) -> Value {
    Value::NativeFunction(NativeFunction { name, func })
}

/// Math utilities under `KIN_IMIBARE`.
fn math_namespace() -> Value {
    let mut map: KinObject = KinObject::new();

    map.set("pi".to_string(), Value::Number(std::f64::consts::PI));
    map.set("umuzikare".to_string(), native("umuzikare", math_sqrt));
    map.set(
        "umubare_utazwi".to_string(),
        native("umubare_utazwi", math_random),
    );
    map.set(
        "kuraho_ibice".to_string(),
        native("kuraho_ibice", math_round),
    );
    map.set("sin".to_string(), native("sin", math_sin));
    map.set("cos".to_string(), native("cos", math_cos));
    map.set("tan".to_string(), native("tan", math_tan));

    Value::object(map)
}

/// String utilities under `KIN_AMAGAMBO`.
fn string_namespace() -> Value {
    let mut map: KinObject = KinObject::new();

    map.set(
        "huza_amagambo".to_string(),
        native("huza_amagambo", string_concat),
    );
    map.set("ingano".to_string(), native("ingano", string_length));
    map.set("gabanya".to_string(), native("gabanya", string_split));

    Value::object(map)
}

/// Clock and calendar utilities under `KIN_IGIHE`.
fn time_namespace() -> Value {
    let mut map: KinObject = KinObject::new();

    map.set("isaha".to_string(), native("isaha", time_clock));
    map.set("umunsi".to_string(), native("umunsi", time_weekday));
    map.set("itariki".to_string(), native("itariki", time_date));

    Value::object(map)
}

/// File utilities under `KIN_DOSIYE`.
fn file_namespace() -> Value {
    let mut map: KinObject = KinObject::new();

    map.set("soma".to_string(), native("soma", file_read));
    map.set("andika".to_string(), native("andika", file_write));

    Value::object(map)
}

// ------------------------------------------------------------------------
// Argument plumbing shared by the natives below.

fn string_arg<'a>(name: &str, args: &'a [Value], index: usize) -> Result<&'a str> {
    match args.get(index) {
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(KinError::native(format!(
            "'{}' expects a string for argument {}, got {}",
            name,
            index + 1,
            other.type_name()
        ))),
        None => Err(KinError::native(format!(
            "'{}' is missing argument {}",
            name,
            index + 1
        ))),
    }
}

fn number_arg(name: &str, args: &[Value], index: usize) -> Result<f64> {
    match args.get(index) {
        Some(Value::Number(n)) => Ok(*n),
        Some(other) => Err(KinError::native(format!(
            "'{}' expects a number for argument {}, got {}",
            name,
            index + 1,
            other.type_name()
        ))),
        None => Err(KinError::native(format!(
            "'{}' is missing argument {}",
            name,
            index + 1
        ))),
    }
}

/// Concatenated display form of every argument, no separators.
fn join_args(args: &[Value]) -> String {
    let mut out = String::new();

    for arg in args {
        out.push_str(&arg.to_string());
    }

    out
}

// ------------------------------------------------------------------------
// Console and system natives.

fn print_values(args: &[Value], _env: &Rc<RefCell<Environment>>) -> Result<Value> {
    println!("{}", join_args(args));

    Ok(Value::Null)
}

/// Prompt on stdout, read one line from stdin. A line that looks like a
/// decimal number comes back as a number; end of input comes back as null.
fn read_input(args: &[Value], _env: &Rc<RefCell<Environment>>) -> Result<Value> {
    let prompt: String = join_args(args);

    print!("{}", prompt);
    std::io::stdout().flush()?;

    let mut line = String::new();
    let read: usize = std::io::stdin().lock().read_line(&mut line)?;

    if read == 0 {
        return Ok(Value::Null);
    }

    let line: &str = line.trim_end_matches(['\r', '\n']);

    if looks_numeric(line) {
        if let Ok(n) = line.parse::<f64>() {
            return Ok(Value::Number(n));
        }
    }

    Ok(Value::String(line.to_string()))
}

/// Matches an optional minus, digits, and an optional fractional part.
/// Deliberately narrower than `f64::from_str`: exponents, leading dots,
/// `inf` and `nan` all stay strings.
fn looks_numeric(s: &str) -> bool {
    let digits: &str = s.strip_prefix('-').unwrap_or(s);

    if digits.is_empty() {
        return false;
    }

    let (integral, fractional) = match digits.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (digits, None),
    };

    if integral.is_empty() || !integral.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }

    match fractional {
        Some(f) => f.bytes().all(|b| b.is_ascii_digit()),
        None => true,
    }
}

/// Run a shell command and return its trimmed stdout.
fn run_shell(args: &[Value], _env: &Rc<RefCell<Environment>>) -> Result<Value> {
    let cmd: &str = string_arg("sisitemu", args, 0)?;

    debug!("Running shell command: {}", cmd);

    let output = Command::new("sh").arg("-c").arg(cmd).output()?;

    if !output.status.success() {
        return Err(KinError::native(format!(
            "Command '{}' failed with {}",
            cmd, output.status
        )));
    }

    let stdout: String = String::from_utf8_lossy(&output.stdout).trim().to_string();

    Ok(Value::String(stdout))
}

// ------------------------------------------------------------------------
// KIN_IMIBARE natives.

fn math_sqrt(args: &[Value], _env: &Rc<RefCell<Environment>>) -> Result<Value> {
    Ok(Value::Number(number_arg("umuzikare", args, 0)?.sqrt()))
}

/// A uniformly random integer in `[ceil(min), floor(max)]`, inclusive on
/// both ends.
fn math_random(args: &[Value], _env: &Rc<RefCell<Environment>>) -> Result<Value> {
    let min: i64 = number_arg("umubare_utazwi", args, 0)?.ceil() as i64;
    let max: i64 = number_arg("umubare_utazwi", args, 1)?.floor() as i64;

    if min > max {
        return Err(KinError::native(format!(
            "'umubare_utazwi' range is empty: {} > {}",
            min, max
        )));
    }

    let n: i64 = rand::thread_rng().gen_range(min..=max);

    Ok(Value::Number(n as f64))
}

fn math_round(args: &[Value], _env: &Rc<RefCell<Environment>>) -> Result<Value> {
    Ok(Value::Number(number_arg("kuraho_ibice", args, 0)?.round()))
}

fn math_sin(args: &[Value], _env: &Rc<RefCell<Environment>>) -> Result<Value> {
    Ok(Value::Number(number_arg("sin", args, 0)?.sin()))
}

fn math_cos(args: &[Value], _env: &Rc<RefCell<Environment>>) -> Result<Value> {
    Ok(Value::Number(number_arg("cos", args, 0)?.cos()))
}

fn math_tan(args: &[Value], _env: &Rc<RefCell<Environment>>) -> Result<Value> {
    Ok(Value::Number(number_arg("tan", args, 0)?.tan()))
}

// ------------------------------------------------------------------------
// KIN_AMAGAMBO natives.

fn string_concat(args: &[Value], _env: &Rc<RefCell<Environment>>) -> Result<Value> {
    let mut out = String::new();

    for (i, arg) in args.iter().enumerate() {
        match arg {
            Value::String(s) => out.push_str(s),
            other => {
                return Err(KinError::native(format!(
                    "'huza_amagambo' expects a string for argument {}, got {}",
                    i + 1,
                    other.type_name()
                )))
            }
        }
    }

    Ok(Value::String(out))
}

fn string_length(args: &[Value], _env: &Rc<RefCell<Environment>>) -> Result<Value> {
    let s: &str = string_arg("ingano", args, 0)?;

    Ok(Value::Number(s.chars().count() as f64))
}

/// Split a string on a separator into an array (an object with decimal
/// index keys, same shape array literals produce).
fn string_split(args: &[Value], _env: &Rc<RefCell<Environment>>) -> Result<Value> {
    let s: &str = string_arg("gabanya", args, 0)?;
    let separator: &str = string_arg("gabanya", args, 1)?;

    let mut map: KinObject = KinObject::new();

    for (i, piece) in s.split(separator).enumerate() {
        map.set(i.to_string(), Value::String(piece.to_string()));
    }

    Ok(Value::object(map))
}

// ------------------------------------------------------------------------
// KIN_IGIHE natives.

fn time_clock(_args: &[Value], _env: &Rc<RefCell<Environment>>) -> Result<Value> {
    Ok(Value::String(Local::now().format("%H:%M:%S").to_string()))
}

fn time_weekday(_args: &[Value], _env: &Rc<RefCell<Environment>>) -> Result<Value> {
    Ok(Value::String(Local::now().format("%A").to_string()))
}

/// Today's date as e.g. `23rd Aug 26`.
fn time_date(_args: &[Value], _env: &Rc<RefCell<Environment>>) -> Result<Value> {
    let now = Local::now();
    let day: u32 = now.format("%d").to_string().parse().unwrap_or(0);

    let suffix: &str = match day {
        11..=13 => "th",
        _ => match day % 10 {
            1 => "st",
            2 => "nd",
            3 => "rd",
            _ => "th",
        },
    };

    Ok(Value::String(format!(
        "{}{} {}",
        day,
        suffix,
        now.format("%b %y")
    )))
}

// ------------------------------------------------------------------------
// KIN_DOSIYE natives. Relative paths resolve against the directory of the
// running script (read back out of `inzira_ya_dosiye`), so a program can
// address files next to itself regardless of the shell's working directory.

fn resolve_path(env: &Rc<RefCell<Environment>>, path: &str) -> PathBuf {
    let path: &Path = Path::new(path);

    if path.is_absolute() {
        return path.to_path_buf();
    }

    if let Ok(Value::String(script)) = env.borrow().lookup("inzira_ya_dosiye") {
        if let Some(dir) = Path::new(&script).parent() {
            if !dir.as_os_str().is_empty() {
                return dir.join(path);
            }
        }
    }

    path.to_path_buf()
}

fn file_read(args: &[Value], env: &Rc<RefCell<Environment>>) -> Result<Value> {
    let path: PathBuf = resolve_path(env, string_arg("soma", args, 0)?);

    debug!("Reading file {}", path.display());

    Ok(Value::String(std::fs::read_to_string(path)?))
}

fn file_write(args: &[Value], env: &Rc<RefCell<Environment>>) -> Result<Value> {
    let path: PathBuf = resolve_path(env, string_arg("andika", args, 0)?);
    let contents: &str = string_arg("andika", args, 1)?;

    debug!("Writing {} bytes to {}", contents.len(), path.display());

    std::fs::write(path, contents)?;

    Ok(Value::Null)
}
