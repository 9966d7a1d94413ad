use std::fs;
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use std::time::{Duration, Instant};

fn shellish(cwd: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_shellish"));
    cmd.current_dir(cwd)
        // keep a developer's ~/.shellishrc out of the picture
        .env("HOME", cwd)
        .env_remove("SHELLISH_LOG");
    cmd
}

fn run_script(cwd: &Path, script: &str) -> Output {
    let mut child = shellish(cwd)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(script.as_bytes()).unwrap();
    child.wait_with_output().unwrap()
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

#[test]
fn pipeline_feeds_sort() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_script(dir.path(), "printf \"3\\n1\\n2\\n\" | sort\n");
    assert_eq!(stdout(&out), "1\n2\n3\n");
    assert!(out.status.success());
}

#[test]
fn early_reader_exit_ends_the_writer_quietly() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_script(dir.path(), "yes | head -n 1\n");
    assert_eq!(stdout(&out), "y\n");
    assert_eq!(stderr(&out), "");
}

#[test]
fn unstartable_program_reports_os_reason() {
    // the system temp dir may be mounted noexec
    let dir = tempfile::tempdir_in(env!("CARGO_TARGET_TMPDIR")).unwrap();
    let bogus = dir.path().join("bogus");
    fs::write(&bogus, b"\x00\x01\x02 not a program\n").unwrap();
    fs::set_permissions(&bogus, fs::Permissions::from_mode(0o755)).unwrap();

    let out = shellish(dir.path())
        .args(["-c", bogus.to_str().unwrap()])
        .stdin(Stdio::null())
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(127));
    assert!(stderr(&out).contains(&format!("-shellish: {}: Exec format error", bogus.display())));
}

#[test]
fn unknown_command_keeps_the_loop_alive() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_script(dir.path(), "definitely-not-a-command-xyz\necho ok\n");
    assert_eq!(stdout(&out), "ok\n");
    assert!(stderr(&out).contains("-shellish: definitely-not-a-command-xyz: command not found"));
}

#[test]
fn parse_errors_are_reported_and_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_script(dir.path(), "cat <\necho \"open\nls | | wc\necho after\n");
    assert_eq!(stdout(&out), "after\n");
    let err = stderr(&out);
    assert!(err.contains("parse error"));
    assert_eq!(err.lines().count(), 3);
}

#[test]
fn redirections_truncate_append_and_read() {
    let dir = tempfile::tempdir().unwrap();
    let script = "echo one > out.txt\necho two >>out.txt\ncat < out.txt\necho fresh >out.txt\n";
    let out = run_script(dir.path(), script);
    assert_eq!(stdout(&out), "one\ntwo\n");
    assert_eq!(fs::read_to_string(dir.path().join("out.txt")).unwrap(), "fresh\n");
}

#[test]
fn input_redirect_wins_over_pipe() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("in.txt"), "from file\n").unwrap();
    let out = run_script(dir.path(), "echo from pipe | cat <in.txt\n");
    assert_eq!(stdout(&out), "from file\n");
}

#[test]
fn missing_input_file_fails_only_that_stage() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_script(dir.path(), "cat <nothing.txt | echo downstream\n");
    assert_eq!(stdout(&out), "downstream\n");
    assert!(stderr(&out).contains("nothing.txt"));
}

#[test]
fn background_pipeline_does_not_block() {
    let dir = tempfile::tempdir().unwrap();
    let started = Instant::now();
    let mut child = shellish(dir.path())
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(b"sleep 5 &\necho done\n").unwrap();
    let status = child.wait().unwrap();
    assert!(status.success());
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[test]
fn cd_changes_directory_for_later_commands() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();
    let out = run_script(dir.path(), "cd sub\npwd\ncd /definitely/missing\npwd\n");
    let expected = dir.path().join("sub").canonicalize().unwrap();
    let text = stdout(&out);
    let printed: Vec<&str> = text.lines().collect();
    assert_eq!(printed.len(), 2);
    assert!(printed.iter().all(|p| Path::new(p) == expected));
    assert!(stderr(&out).contains("cd: /definitely/missing"));
}

#[test]
fn builtins_run_inside_pipelines() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_script(dir.path(), "printf \"a:b:c\\nd:e:f\\n\" | cut -d : -f 3,1\nhelp | grep chatroom\n");
    assert_eq!(stdout(&out), "c:a\nf:d\n  chatroom ROOM USER\n");
}

#[test]
fn repeat_runs_a_program_n_times() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_script(dir.path(), "repeat 3 echo hi\n");
    assert_eq!(stdout(&out), "hi\nhi\nhi\n");
}

#[test]
fn exit_ends_the_session_with_its_code() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_script(dir.path(), "exit 3\necho never\n");
    assert_eq!(out.status.code(), Some(3));
    assert_eq!(stdout(&out), "");
}

#[test]
fn exit_inside_a_pipeline_only_ends_its_stage() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_script(dir.path(), "echo hi | exit 4\necho still here\n");
    assert_eq!(stdout(&out), "still here\n");
    assert!(out.status.success());
}

#[test]
fn command_flag_exits_with_last_status() {
    let dir = tempfile::tempdir().unwrap();
    let status = |line: &str| {
        shellish(dir.path())
            .args(["-c", line])
            .stdin(Stdio::null())
            .output()
            .unwrap()
            .status
            .code()
    };
    assert_eq!(status("true | false"), Some(1));
    assert_eq!(status("false | true"), Some(0));
    assert_eq!(status("no-such-thing-here"), Some(127));
    assert_eq!(status("exit 7"), Some(7));
    assert_eq!(status("exit 256"), Some(1));
}

#[test]
fn chatroom_joins_and_leaves() {
    let dir = tempfile::tempdir().unwrap();
    let chat_dir = dir.path().join("chat");
    fs::create_dir(&chat_dir).unwrap();
    let rc = dir.path().join("shellish.conf");
    fs::write(&rc, format!("sysname=mysh\nchat_dir={}\n", chat_dir.display())).unwrap();

    let mut child = shellish(dir.path())
        .args(["--config", rc.to_str().unwrap()])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"chatroom lobby alice\nhello\n/exit\nnot-a-real-cmd\n")
        .unwrap();
    let out = child.wait_with_output().unwrap();

    let text = stdout(&out);
    assert!(text.contains("Entered chatroom 'lobby' as 'alice'"));
    assert!(text.contains("Left chatroom 'lobby'."));
    let room = chat_dir.join("chatroom-lobby");
    assert!(room.is_dir());
    assert!(!room.join("alice").exists());
    // the line after /exit went back to the interpreter
    assert!(stderr(&out).contains("-mysh: not-a-real-cmd: command not found"));
}

#[test]
fn bad_config_is_a_startup_error() {
    let dir = tempfile::tempdir().unwrap();
    let rc = dir.path().join("broken.conf");
    fs::write(&rc, "colour=blue\n").unwrap();
    let out = shellish(dir.path())
        .args(["--config", rc.to_str().unwrap()])
        .stdin(Stdio::null())
        .output()
        .unwrap();
    assert!(!out.status.success());
    assert!(stderr(&out).contains("failed to load config"));
}
