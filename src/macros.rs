// Reporting on the interpreter's own streams must never abort it: a closed stdout during
// `--help` is not worth a panic. Both macros drop the write result.
macro_rules! println_ignore_io_error {
    ($($tt:tt)*) => {{
        use std::io::Write;
        let _ = writeln!(std::io::stdout(), $($tt)*);
    }}
}

macro_rules! eprintln_ignore_io_error {
    ($($tt:tt)*) => {{
        use std::io::Write;
        let _ = writeln!(std::io::stderr(), $($tt)*);
    }}
}

// Command output goes to the `Shell`'s writer so tests can capture it and write failures reach
// the read loop; diagnostics go through `user_error!`. In debug builds the std printing macros
// are shadowed so a stray one fails to compile.
#[allow(unused_macros)]
#[cfg(debug_assertions)]
macro_rules! println {
    ($($tt:tt)*) => {
        compile_error!("command output is written to the shell's writer, not with `println!`")
    };
}

#[allow(unused_macros)]
#[cfg(debug_assertions)]
macro_rules! print {
    ($($tt:tt)*) => {
        compile_error!("the prompt and command output go to the shell's writer, not `print!`")
    };
}

#[allow(unused_macros)]
#[cfg(debug_assertions)]
macro_rules! eprintln {
    ($($tt:tt)*) => {
        compile_error!("report errors with `user_error!`, or `eprintln_ignore_io_error!` before logging is set up")
    };
}

#[allow(unused_macros)]
#[cfg(debug_assertions)]
macro_rules! eprint {
    ($($tt:tt)*) => {
        compile_error!("diagnostics are whole lines; use `user_error!` instead of `eprint!`")
    };
}
