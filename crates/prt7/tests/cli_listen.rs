#![cfg(all(unix, feature = "cli"))]

use std::io::Write;
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = PathBuf::from(format!(
        "/tmp/prt7cli-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

fn connect_when_ready(path: &Path, timeout: Duration) -> UnixStream {
    let start = Instant::now();
    loop {
        if path.exists() {
            if let Ok(stream) = UnixStream::connect(path) {
                return stream;
            }
        }
        if start.elapsed() >= timeout {
            panic!("connect timeout");
        }
        thread::sleep(Duration::from_millis(25));
    }
}

#[test]
fn listen_decodes_each_connection_in_its_own_session() {
    let dir = unique_temp_dir("listen");
    let sock_path = dir.join("prt7.sock");

    let child = Command::new(env!("CARGO_BIN_EXE_prt7"))
        .args(["--log-level", "error", "--format", "raw", "listen"])
        .arg(&sock_path)
        .args(["--connections", "2"])
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("listen command should start");

    let mut first = connect_when_ready(&sock_path, Duration::from_secs(3));
    first
        .write_all(b"emitter boot\nL,H\nM,1\nL,H\n")
        .expect("first source should write");
    drop(first);

    let mut second = connect_when_ready(&sock_path, Duration::from_secs(3));
    second
        .write_all(b"M,13\nL,A\n")
        .expect("second source should write");
    drop(second);

    let output = child.wait_with_output().expect("listen should exit");
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "HI\nN\n");
    assert!(!sock_path.exists());

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn idle_listen_stops_on_sigint() {
    let dir = unique_temp_dir("sigint");
    let sock_path = dir.join("prt7.sock");

    let mut child = Command::new(env!("CARGO_BIN_EXE_prt7"))
        .args(["--log-level", "error", "--format", "raw", "listen"])
        .arg(&sock_path)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("listen command should start");

    let start = Instant::now();
    while !sock_path.exists() {
        assert!(start.elapsed() < Duration::from_secs(3), "socket never appeared");
        thread::sleep(Duration::from_millis(25));
    }
    // Give the handler time to install after bind.
    thread::sleep(Duration::from_millis(200));

    let status = Command::new("kill")
        .args(["-INT", &child.id().to_string()])
        .status()
        .expect("kill should run");
    assert!(status.success());

    let start = Instant::now();
    let exit = loop {
        if let Some(exit) = child.try_wait().expect("child status should be readable") {
            break exit;
        }
        if start.elapsed() >= Duration::from_secs(5) {
            let _ = child.kill();
            panic!("listen kept running after SIGINT");
        }
        thread::sleep(Duration::from_millis(25));
    };
    assert!(exit.success());
    assert!(!sock_path.exists());

    let _ = std::fs::remove_dir_all(dir);
}
