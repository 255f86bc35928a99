use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_displays_usage() {
    Command::cargo_bin("kks")
        .expect("binary exists")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"))
        .stdout(predicate::str::contains("edit"));
}

#[test]
fn completions_are_generated_without_kak() {
    Command::cargo_bin("kks")
        .expect("binary exists")
        .args(["completions", "bash"])
        .env("PATH", "")
        .assert()
        .success()
        .stdout(predicate::str::contains("kks"));
}

#[cfg(unix)]
mod with_fake_kak {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};

    use assert_cmd::Command;
    use predicates::prelude::*;
    use tempfile::TempDir;

    const FAKE_KAK: &str = r#"#!/bin/sh
case "$1" in
  -l)
    for name in $FAKE_KAK_SESSIONS; do echo "$name"; done
    if [ -f "$FAKE_KAK_STARTED" ]; then cat "$FAKE_KAK_STARTED"; fi
    ;;
  -s)
    echo "$2" >> "$FAKE_KAK_STARTED"
    ;;
  -p)
    cat > "$FAKE_KAK_SCRIPT"
    ;;
  *)
    echo "kak $*"
    ;;
esac
"#;

    struct Sandbox {
        dir: TempDir,
    }

    impl Sandbox {
        fn new() -> Self {
            let dir = tempfile::tempdir().expect("temp dir");
            let bin = dir.path().join("bin");
            fs::create_dir_all(&bin).expect("bin dir");
            fs::create_dir_all(dir.path().join("config")).expect("config dir");
            let kak = bin.join("kak");
            fs::write(&kak, FAKE_KAK).expect("write fake kak");
            fs::set_permissions(&kak, fs::Permissions::from_mode(0o755)).expect("chmod");
            Self { dir }
        }

        fn root(&self) -> &Path {
            self.dir.path()
        }

        fn script_path(&self) -> PathBuf {
            self.root().join("script.kak")
        }

        fn kks(&self) -> Command {
            let mut cmd = Command::cargo_bin("kks").expect("binary exists");
            cmd.current_dir(self.root())
                .env_clear()
                .env(
                    "PATH",
                    format!("{}:/usr/bin:/bin", self.root().join("bin").display()),
                )
                .env("HOME", self.root())
                .env("XDG_CONFIG_HOME", self.root().join("config"))
                .env("FAKE_KAK_SCRIPT", self.script_path())
                .env("FAKE_KAK_STARTED", self.root().join("started"));
            cmd
        }
    }

    #[test]
    fn edit_without_session_execs_fresh_kak() {
        let sandbox = Sandbox::new();
        sandbox
            .kks()
            .args(["edit", "notes.txt", "+3:7"])
            .assert()
            .success()
            .stdout("kak notes.txt +3:7\n");
    }

    #[test]
    fn edit_connects_to_running_default_session() {
        let sandbox = Sandbox::new();
        sandbox
            .kks()
            .args(["e", "notes.txt"])
            .env("FAKE_KAK_SESSIONS", "other kks")
            .assert()
            .success()
            .stdout("kak -c kks notes.txt\n");
    }

    #[test]
    fn default_session_comes_from_env() {
        let sandbox = Sandbox::new();
        sandbox
            .kks()
            .args(["edit"])
            .env("FAKE_KAK_SESSIONS", "work")
            .env("KKS_DEFAULT_SESSION", "work")
            .assert()
            .success()
            .stdout("kak -c work\n");
    }

    #[test]
    fn edit_inside_client_sends_escaped_edit_command() {
        let sandbox = Sandbox::new();
        sandbox
            .kks()
            .args(["edit", "my file.txt"])
            .env("KKS_SESSION", "proj")
            .env("KKS_CLIENT", "c1")
            .assert()
            .success()
            .stdout("");

        let script = fs::read_to_string(sandbox.script_path()).expect("script was piped");
        assert!(
            script.starts_with("try %{ eval -try-client c1 edit -existing my\\\\ file.txt }"),
            "{script}"
        );
        assert!(script.contains("catch %{"));
    }

    #[test]
    fn edit_inside_client_ignores_ambient_buffer() {
        let sandbox = Sandbox::new();
        sandbox
            .kks()
            .args(["edit", "foo.txt"])
            .env("KKS_SESSION", "proj")
            .env("KKS_CLIENT", "c1")
            .env("KKS_BUFFER", "*scratch*")
            .assert()
            .success();

        let script = fs::read_to_string(sandbox.script_path()).expect("script was piped");
        assert!(
            script.starts_with("try %{ eval -try-client c1 edit -existing foo.txt }"),
            "{script}"
        );
        assert!(!script.contains("-buffer"));
    }

    #[test]
    fn gitdir_session_is_started_and_announced() {
        let sandbox = Sandbox::new();
        let repo = sandbox.root().join("webapp");
        fs::create_dir_all(repo.join(".git")).expect("git dir");

        sandbox
            .kks()
            .current_dir(&repo)
            .args(["edit", "main.go", "+5"])
            .env("KKS_USE_GITDIR_SESSIONS", "1")
            .assert()
            .success()
            .stderr(predicate::str::contains(
                "new session for git directory started: webapp",
            ))
            .stdout("kak -c webapp main.go +5\n");
    }

    #[test]
    fn send_writes_error_file_directive() {
        let sandbox = Sandbox::new();
        let errors = sandbox.root().join("errors.log");
        sandbox
            .kks()
            .args(["send", "-s", "proj", "--err-out"])
            .arg(&errors)
            .args(["echo", "hello"])
            .assert()
            .success();

        let script = fs::read_to_string(sandbox.script_path()).expect("script was piped");
        assert!(script.starts_with("try %{ eval echo hello }"), "{script}");
        assert!(script.contains(&format!(
            "echo -to-file {} __kks_error__ %val{{error}}",
            errors.display()
        )));
    }

    #[test]
    fn send_requires_a_session() {
        let sandbox = Sandbox::new();
        sandbox
            .kks()
            .args(["send", "echo", "hi"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("no session"));
    }

    #[test]
    fn list_prints_sessions() {
        let sandbox = Sandbox::new();
        sandbox
            .kks()
            .arg("list")
            .env("FAKE_KAK_SESSIONS", "alpha beta")
            .assert()
            .success()
            .stdout("alpha\nbeta\n");
    }

    #[test]
    fn errors_prints_prefixed_lines_only() {
        let sandbox = Sandbox::new();
        let errors = sandbox.root().join("errors.log");
        fs::write(
            &errors,
            "__kks_error__ no such command: 'frob'\nunrelated line\n",
        )
        .expect("write errors");
        sandbox
            .kks()
            .arg("errors")
            .arg(&errors)
            .assert()
            .success()
            .stdout("no such command: 'frob'\n");
    }

    #[test]
    fn missing_kak_is_reported() {
        let sandbox = Sandbox::new();
        sandbox
            .kks()
            .args(["edit", "notes.txt"])
            .env("PATH", sandbox.root().join("config"))
            .assert()
            .failure()
            .stderr(predicate::str::contains("not found"));
    }
}
