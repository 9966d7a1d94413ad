use std::fs::{self, DirBuilder, OpenOptions};
use std::io::{self, Read, Write};
use std::os::unix::fs::{DirBuilderExt, FileTypeExt, OpenOptionsExt};
use std::path::{Path, PathBuf};
use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use nix::sys::stat::Mode;
use nix::sys::wait::waitpid;
use nix::unistd::{fork, mkfifo, ForkResult, Pid};
use argh::FromArgs;
use crate::ast::Command;
use crate::config::Config;
use crate::io::InputHandler;
use super::manager::{parse_args, BuiltinStatus};

#[derive(FromArgs)]
/// Join a FIFO based chat room.
struct ChatArgs {
    #[argh(positional)]
    /// room to join; created on first use.
    room: String,
    #[argh(positional)]
    /// name other members see.
    user: String,
}

pub fn room_dir(base: &Path, room: &str) -> PathBuf {
    base.join(format!("chatroom-{}", room))
}

fn valid_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains('/')
}

/// Creates the room directory and the member's FIFO; both may already exist.
pub fn join_room(dir: &Path, user: &str) -> io::Result<PathBuf> {
    match DirBuilder::new().mode(0o777).create(dir) {
        Err(e) if e.kind() != io::ErrorKind::AlreadyExists => return Err(e),
        _ => {}
    }
    let fifo = dir.join(user);
    match mkfifo(&fifo, Mode::from_bits_truncate(0o666)) {
        Ok(()) | Err(Errno::EEXIST) => Ok(fifo),
        Err(e) => Err(e.into()),
    }
}

/// Writes `msg` to every other member's FIFO. Opens are non-blocking, so a
/// FIFO nobody is reading is skipped. Returns how many members got it.
pub fn broadcast(dir: &Path, sender: &str, msg: &str) -> io::Result<usize> {
    let mut delivered = 0;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_name() == sender || !entry.file_type()?.is_fifo() {
            continue;
        }
        let target = OpenOptions::new()
            .write(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(entry.path());
        if let Ok(mut fifo) = target {
            if fifo.write_all(msg.as_bytes()).is_ok() {
                delivered += 1;
            }
        }
    }
    Ok(delivered)
}

// Copies the member's FIFO to stdout until killed.
fn reader_loop(fifo: &Path) -> ! {
    // read+write so the FIFO never reports end-of-file between writers
    let code = match OpenOptions::new().read(true).write(true).open(fifo) {
        Ok(mut f) => {
            let mut buf = [0u8; 1024];
            let mut out = io::stdout();
            loop {
                match f.read(&mut buf) {
                    Ok(0) => break 0,
                    Ok(n) => {
                        let _ = out.write_all(&buf[..n]);
                        let _ = out.flush();
                    }
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                    Err(_) => break 1,
                }
            }
        }
        Err(_) => 1,
    };
    unsafe { libc::_exit(code) }
}

fn spawn_reader(fifo: &Path) -> nix::Result<Pid> {
    let _ = io::stdout().flush();
    // SAFETY: the child only does file I/O and then `_exit`s.
    match unsafe { fork() }? {
        ForkResult::Child => reader_loop(fifo),
        ForkResult::Parent { child } => Ok(child),
    }
}

pub fn chatroom(cmd: &Command, config: &Config) -> BuiltinStatus {
    let args: ChatArgs = match parse_args(cmd) {
        Ok(args) => args,
        Err(status) => return status,
    };
    let sysname = &config.sysname;
    if !valid_name(&args.room) || !valid_name(&args.user) {
        eprintln!("-{}: chatroom: invalid room or user name", sysname);
        return BuiltinStatus::Failure;
    }

    let dir = room_dir(&config.chat_dir, &args.room);
    let fifo = match join_room(&dir, &args.user) {
        Ok(fifo) => fifo,
        Err(e) => {
            eprintln!("-{}: chatroom: {}: {}", sysname, dir.display(), e);
            return BuiltinStatus::Failure;
        }
    };
    let reader = match spawn_reader(&fifo) {
        Ok(pid) => pid,
        Err(e) => {
            eprintln!("-{}: chatroom: fork failed: {}", sysname, e.desc());
            let _ = fs::remove_file(&fifo);
            return BuiltinStatus::Failure;
        }
    };

    println!("Entered chatroom '{}' as '{}'. Type /exit to leave.", args.room, args.user);
    let mut input = InputHandler::stdin();
    loop {
        let line = match input.read_line(Some("chat> ")) {
            Ok(Some(line)) => line,
            _ => break,
        };
        if line.text == "/exit" {
            break;
        }
        let msg = format!("{}: {}\n", args.user, line.text);
        if let Err(e) = broadcast(&dir, &args.user, &msg) {
            eprintln!("-{}: chatroom: {}: {}", sysname, dir.display(), e);
        }
    }

    let _ = kill(reader, Signal::SIGTERM);
    let _ = waitpid(reader, None);
    let _ = fs::remove_file(&fifo);
    println!("Left chatroom '{}'.", args.room);
    BuiltinStatus::Success
}
