//! End-to-end runs of a toy compiler step against the synchronous host.

use std::collections::BTreeSet;

use tsweb_fs::{
    CompilerHost, HostError, HostOptions, HostResult, MemoryBackend, NotReady, Operation,
    StepOutcome, SyncFs, drive, resolve, run_until_ready,
};

/// Outcome of one toy compile: every module reached from the entry point,
/// and the imports that could not be found.
#[derive(Debug, Default, PartialEq, Eq)]
struct Compilation {
    modules: BTreeSet<String>,
    missing: BTreeSet<String>,
}

fn imports(source: &str) -> impl Iterator<Item = &str> {
    source.lines().filter_map(|line| {
        let rest = line.trim().strip_prefix("import ")?;
        let specifier = rest.trim_end_matches(';').trim();
        specifier.strip_prefix('\'')?.strip_suffix('\'')
    })
}

fn parent(path: &str) -> &str {
    path.rsplit_once('/').map_or("/", |(dir, _)| dir)
}

/// Follows `import './x';` lines from `entry`, appending `.ts` to each
/// specifier. Missing modules become diagnostics.
fn compile(fs: &SyncFs, entry: &str) -> HostResult<StepOutcome<Compilation>> {
    let mut compilation = Compilation::default();
    let mut queue = vec![fs.resolve(entry)];

    while let Some(path) = queue.pop() {
        if compilation.modules.contains(&path) || compilation.missing.contains(&path) {
            continue;
        }
        let Some(source) = fs.read_file(&path, None)? else {
            compilation.missing.insert(path);
            continue;
        };
        for specifier in imports(&source) {
            queue.push(resolve(parent(&path), &format!("{specifier}.ts")));
        }
        compilation.modules.insert(path);
    }

    if compilation.missing.is_empty() {
        fs.write_file("out/modules.txt", &modules_listing(&compilation), false)?;
        Ok(StepOutcome::Complete(compilation))
    } else {
        Ok(StepOutcome::Incomplete(compilation))
    }
}

fn modules_listing(compilation: &Compilation) -> String {
    compilation
        .modules
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("\n")
}

fn project() -> MemoryBackend {
    MemoryBackend::with_files([
        ("/proj/src/index.ts", "import './util';\nimport './lib/math';\n"),
        ("/proj/src/util.ts", "export const util = 1;\n"),
        ("/proj/src/lib/math.ts", "import '../util';\nexport const add = 1;\n"),
    ])
}

#[tokio::test]
async fn compile_follows_imports_to_completion() {
    let backend = project();
    let fs = SyncFs::new(backend.clone(), HostOptions::new("/proj"));

    let outcome = drive(&fs, |fs| compile(fs, "src/index.ts")).await.unwrap();

    let compilation = match outcome {
        StepOutcome::Complete(compilation) => compilation,
        other => panic!("compile should complete: {other:?}"),
    };
    assert_eq!(
        compilation.modules.iter().map(String::as_str).collect::<Vec<_>>(),
        vec!["/proj/src/index.ts", "/proj/src/lib/math.ts", "/proj/src/util.ts"]
    );
    for module in &compilation.modules {
        assert_eq!(backend.calls(Operation::Read, module), 1, "{module}");
    }

    assert_eq!(fs.cache().pending_len(), 0);
    assert_eq!(
        backend.contents("/proj/out/modules.txt"),
        Some(b"/proj/src/index.ts\n/proj/src/lib/math.ts\n/proj/src/util.ts".to_vec())
    );
}

#[tokio::test]
async fn compile_with_missing_import_stops_once_nothing_is_pending() {
    let backend = MemoryBackend::with_files([("/proj/main.ts", "import './gone';\n")]);
    let fs = SyncFs::new(backend.clone(), HostOptions::new("/proj"));
    let mut passes = 0;

    let outcome = drive(&fs, |fs| {
        passes += 1;
        compile(fs, "main.ts")
    })
    .await
    .unwrap();

    let StepOutcome::Incomplete(compilation) = outcome else {
        panic!("missing import should leave the compile incomplete");
    };
    assert_eq!(
        compilation.missing.into_iter().collect::<Vec<_>>(),
        vec!["/proj/gone.ts"]
    );
    // Two misses, one full pass that drains them, one pass that finds
    // nothing left to wait for.
    assert_eq!(passes, 4);
    assert_eq!(backend.calls(Operation::Read, "/proj/gone.ts"), 1);
    assert_eq!(fs.cache().pending_len(), 0);
}

#[tokio::test]
async fn data_added_between_runs_is_not_seen_by_the_same_host() {
    let backend = MemoryBackend::with_files([("/proj/main.ts", "import './late';\n")]);
    let fs = SyncFs::new(backend.clone(), HostOptions::new("/proj"));

    let first = drive(&fs, |fs| compile(fs, "main.ts")).await.unwrap();
    assert!(!first.is_complete());

    backend.insert("/proj/late.ts", "export {};\n");
    let second = drive(&fs, |fs| compile(fs, "main.ts")).await.unwrap();
    assert!(!second.is_complete());

    let fresh = SyncFs::new(backend.clone(), HostOptions::new("/proj"));
    let third = drive(&fresh, |fs| compile(fs, "main.ts")).await.unwrap();
    assert!(third.is_complete());
}

#[tokio::test]
async fn unsupported_call_aborts_the_run() {
    let fs = SyncFs::new(project(), HostOptions::new("/proj"));

    let err = drive(&fs, |fs| {
        let outcome = compile(fs, "src/index.ts")?;
        fs.get_width_of_terminal()?;
        Ok(outcome)
    })
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        HostError::Unsupported {
            method: "getWidthOfTerminal",
            ..
        }
    ));
    assert_eq!(err.to_string(), "Method getWidthOfTerminal not implemented. []");
}

#[tokio::test]
async fn first_read_waits_then_hits() {
    let backend = MemoryBackend::with_files([("/proj/a.ts", "export const x=1;")]);
    let fs = SyncFs::new(backend, HostOptions::new("/proj"));

    let err = fs.read_file("/proj/a.ts", None).unwrap_err();
    let not_ready = match err {
        HostError::NotReady(not_ready) => not_ready,
        other => panic!("first read should not be ready: {other}"),
    };
    not_ready.into_pending().await;

    assert_eq!(
        fs.read_file("/proj/a.ts", None).unwrap().as_deref(),
        Some("export const x=1;")
    );
    assert!(fs.file_exists("/proj/a.ts").unwrap());
}

#[tokio::test]
async fn operation_that_misses_once_runs_twice() {
    let fs = SyncFs::new(project(), HostOptions::new("/proj"));
    let mut calls = 0;

    let content = run_until_ready(|| {
        calls += 1;
        fs.cache()
            .read_file("/proj/src/util.ts")
            .map(|entry| entry.into_content())
    })
    .await
    .unwrap();

    assert_eq!(content.as_deref(), Some("export const util = 1;\n"));
    assert_eq!(calls, 2);
}

#[tokio::test]
async fn not_ready_displays_the_operation() {
    let fs = SyncFs::new(project(), HostOptions::new("/proj"));
    let not_ready: NotReady = fs.cache().read_directory("/proj/src").unwrap_err();
    assert_eq!(
        not_ready.to_string(),
        "not ready: waiting for listing of /proj/src"
    );
}
