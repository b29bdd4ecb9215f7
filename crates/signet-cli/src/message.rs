//! The single `signet` operation: seal a message or open one.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use tempfile::NamedTempFile;

use signet_core::ParticipantId;
use signet_directory::{
    CachedDirectory, CompositeDirectory, Directory, RemoteDirectory, TrustDirectory,
};
use signet_keystore::Keystore;
use signet_subscriber::Subscriber;

/// How long a certificate fetched from the remote directory may be reused
/// before the endpoint is asked again.
const REMOTE_CACHE_TTL: Duration = Duration::from_secs(300);

/// Arguments for a single message operation.
#[derive(Args, Debug)]
pub struct MessageArgs {
    /// Recipient identifier. When given, the source is signed and encrypted
    /// for this participant; when absent, the source is treated as a
    /// received envelope to decrypt and verify.
    #[arg(long)]
    pub recipient: Option<String>,

    /// Path to read the message from.
    #[arg(long)]
    pub source: PathBuf,

    /// Path to write the result to.
    #[arg(long)]
    pub sink: PathBuf,

    /// Path to the credential store.
    #[arg(long)]
    pub keystore: PathBuf,

    /// Password the store is sealed under.
    #[arg(long = "store-pass")]
    pub store_pass: String,

    /// Credential store format.
    #[arg(long = "store-type", default_value = "signet")]
    pub store_type: StoreType,

    /// Alias of the key entry to act as.
    #[arg(long)]
    pub alias: String,

    /// Password of the key entry, for entries sealed under their own.
    /// Falls back to the store password when absent.
    #[arg(long = "key-pass")]
    pub key_pass: Option<String>,

    /// Remote directory endpoint consulted when the local trust store
    /// cannot resolve a participant.
    #[arg(long)]
    pub remote: Option<String>,

    /// Timeout in seconds for remote directory requests.
    #[arg(long = "remote-timeout", default_value_t = 10)]
    pub remote_timeout: u64,
}

/// Supported credential store formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreType {
    /// The signet keystore file format.
    Signet,
}

/// Execute one message operation.
pub fn run_message(args: &MessageArgs) -> Result<u8> {
    let store = Keystore::open(&args.keystore, &args.store_pass)
        .with_context(|| format!("opening keystore {}", args.keystore.display()))?;
    // Protected entries sealed under the store password open without an
    // explicit --key-pass; unprotected entries ignore the password anyway.
    let key_pass = args.key_pass.as_deref().unwrap_or(&args.store_pass);
    let identity = store
        .identity(&args.alias, Some(key_pass))
        .with_context(|| format!("loading identity '{}'", args.alias))?;
    let directory = build_directory(&store, args)?;
    // The directory holds its own copies; drop the unsealed store before any
    // message work starts.
    drop(store);
    let subscriber = Subscriber::new(identity, directory);

    match &args.recipient {
        Some(recipient) => {
            let recipient: ParticipantId = recipient
                .parse()
                .with_context(|| format!("invalid recipient identifier '{recipient}'"))?;
            run_seal(&subscriber, &recipient, &args.source, &args.sink)
        }
        None => run_open(&subscriber, &args.source, &args.sink),
    }
}

/// The trust store, with the remote endpoint (if any) as lower-priority
/// fallback behind a bounded-time cache.
fn build_directory(store: &Keystore, args: &MessageArgs) -> Result<CompositeDirectory> {
    let trust = TrustDirectory::from_keystore(store);
    tracing::debug!("trust store resolves {} subject(s)", trust.subject_count());
    let mut composite = CompositeDirectory::new(vec![Box::new(trust)]);
    if let Some(endpoint) = &args.remote {
        let remote = RemoteDirectory::new(endpoint, Duration::from_secs(args.remote_timeout))
            .with_context(|| format!("invalid remote directory endpoint '{endpoint}'"))?;
        composite.push(Box::new(CachedDirectory::new(remote, REMOTE_CACHE_TTL)));
    }
    Ok(composite)
}

fn run_seal<D: Directory>(
    subscriber: &Subscriber<D>,
    recipient: &ParticipantId,
    source: &Path,
    sink: &Path,
) -> Result<u8> {
    let mut reader = open_source(source)?;
    let mut staged = stage_sink(sink)?;
    {
        let mut writer = BufWriter::new(staged.as_file_mut());
        subscriber
            .sign_and_encrypt_to(recipient, &mut reader, &mut writer)
            .with_context(|| format!("sealing message for '{recipient}'"))?;
        writer.flush()?;
    }
    persist_sink(staged, sink)?;
    tracing::info!(
        "sealed {} for '{recipient}' into {}",
        source.display(),
        sink.display()
    );
    Ok(0)
}

fn run_open<D: Directory>(subscriber: &Subscriber<D>, source: &Path, sink: &Path) -> Result<u8> {
    let reader = open_source(source)?;
    let mut verified = subscriber
        .decrypt_and_verify_from(reader)
        .with_context(|| format!("opening envelope {}", source.display()))?;
    let sender = verified.sender().clone();
    let mut staged = stage_sink(sink)?;
    std::io::copy(&mut verified, staged.as_file_mut())
        .with_context(|| format!("writing plaintext to {}", sink.display()))?;
    persist_sink(staged, sink)?;
    tracing::info!(
        "verified message from '{sender}' into {}",
        sink.display()
    );
    Ok(0)
}

fn open_source(source: &Path) -> Result<BufReader<File>> {
    let file =
        File::open(source).with_context(|| format!("opening source {}", source.display()))?;
    Ok(BufReader::new(file))
}

/// A temporary file in the sink's directory, so the final persist is a
/// rename on the same filesystem.
fn stage_sink(sink: &Path) -> Result<NamedTempFile> {
    let dir = match sink.parent() {
        Some(parent) if parent != Path::new("") => parent,
        _ => Path::new("."),
    };
    NamedTempFile::new_in(dir)
        .with_context(|| format!("creating temporary file next to {}", sink.display()))
}

fn persist_sink(staged: NamedTempFile, sink: &Path) -> Result<()> {
    staged
        .persist(sink)
        .map_err(|e| e.error)
        .with_context(|| format!("persisting {}", sink.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use signet_core::Timestamp;

    fn ts(iso: &str) -> Timestamp {
        Timestamp::parse(iso).unwrap()
    }

    fn fast_params() -> signet_crypto::kdf::KdfParams {
        signet_crypto::kdf::KdfParams {
            m_cost: 1024,
            t_cost: 1,
            p_cost: 1,
        }
    }

    /// A saved store holding one identity for `name` plus the given trusted
    /// certificates.
    fn saved_store(
        dir: &Path,
        name: &str,
        trusted: &[signet_credential::Certificate],
    ) -> PathBuf {
        let mut store = Keystore::with_kdf_params(fast_params());
        store
            .generate_identity(
                "main",
                name.parse().unwrap(),
                ts("2020-01-01T00:00:00Z"),
                ts("2099-01-01T00:00:00Z"),
                None,
            )
            .unwrap();
        for certificate in trusted {
            store.add_trusted_certificate(certificate.clone());
        }
        let path = dir.join(format!("{name}.sgks"));
        store.save(&path, "store-pw").unwrap();
        path
    }

    fn message_args(
        recipient: Option<&str>,
        source: &Path,
        sink: &Path,
        keystore: &Path,
    ) -> MessageArgs {
        MessageArgs {
            recipient: recipient.map(str::to_string),
            source: source.to_path_buf(),
            sink: sink.to_path_buf(),
            keystore: keystore.to_path_buf(),
            store_pass: "store-pw".to_string(),
            store_type: StoreType::Signet,
            alias: "main".to_string(),
            key_pass: None,
            remote: None,
            remote_timeout: 10,
        }
    }

    #[test]
    fn test_seal_then_open_between_stores() {
        let dir = tempfile::tempdir().unwrap();

        // Two participants who trust each other's certificates.
        let mut alice_store = Keystore::with_kdf_params(fast_params());
        let alice = alice_store
            .generate_identity(
                "main",
                "alice".parse().unwrap(),
                ts("2020-01-01T00:00:00Z"),
                ts("2099-01-01T00:00:00Z"),
                None,
            )
            .unwrap();
        let bob_path = saved_store(dir.path(), "bob", &[alice.certificate().clone()]);

        let mut bob_store = Keystore::open(&bob_path, "store-pw").unwrap();
        let bob = bob_store.identity("main", None).unwrap();
        alice_store.add_trusted_certificate(bob.certificate().clone());
        let alice_path = dir.path().join("alice.sgks");
        alice_store.save(&alice_path, "store-pw").unwrap();

        let plaintext = dir.path().join("letter.txt");
        std::fs::write(&plaintext, b"dear bob").unwrap();
        let envelope = dir.path().join("letter.sgnv");
        let code = run_message(&message_args(
            Some("bob"),
            &plaintext,
            &envelope,
            &alice_path,
        ))
        .unwrap();
        assert_eq!(code, 0);

        let recovered = dir.path().join("recovered.txt");
        let code = run_message(&message_args(None, &envelope, &recovered, &bob_path)).unwrap();
        assert_eq!(code, 0);
        assert_eq!(std::fs::read(&recovered).unwrap(), b"dear bob");
    }

    #[test]
    fn test_failed_seal_leaves_no_sink() {
        let dir = tempfile::tempdir().unwrap();
        let store_path = saved_store(dir.path(), "alice", &[]);
        let plaintext = dir.path().join("letter.txt");
        std::fs::write(&plaintext, b"hello").unwrap();
        let sink = dir.path().join("letter.sgnv");

        // "ghost" resolves nowhere.
        let result = run_message(&message_args(
            Some("ghost"),
            &plaintext,
            &sink,
            &store_path,
        ));
        assert!(result.is_err());
        assert!(!sink.exists());
        // The staged temp file is cleaned up too.
        let leftovers = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with(".tmp"))
            .count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn test_key_password_falls_back_to_store_password() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = Keystore::with_kdf_params(fast_params());
        let alice = store
            .generate_identity(
                "main",
                "alice".parse().unwrap(),
                ts("2020-01-01T00:00:00Z"),
                ts("2099-01-01T00:00:00Z"),
                Some("store-pw"),
            )
            .unwrap();
        store.add_trusted_certificate(alice.certificate().clone());
        let store_path = dir.path().join("alice.sgks");
        store.save(&store_path, "store-pw").unwrap();

        let plaintext = dir.path().join("note.txt");
        std::fs::write(&plaintext, b"note to self").unwrap();
        let envelope = dir.path().join("note.sgnv");

        // The entry is sealed under the store password and no --key-pass is
        // given; both operations still open it.
        let code = run_message(&message_args(
            Some("alice"),
            &plaintext,
            &envelope,
            &store_path,
        ))
        .unwrap();
        assert_eq!(code, 0);

        let recovered = dir.path().join("recovered.txt");
        let code =
            run_message(&message_args(None, &envelope, &recovered, &store_path)).unwrap();
        assert_eq!(code, 0);
        assert_eq!(std::fs::read(&recovered).unwrap(), b"note to self");

        // An explicit key password still takes precedence over the fallback.
        let mut wrong = message_args(None, &envelope, &recovered, &store_path);
        wrong.key_pass = Some("wrong".to_string());
        let err = run_message(&wrong).unwrap_err();
        assert!(format!("{err:#}").contains("loading identity"));
    }

    #[test]
    fn test_stage_sink_handles_parentless_paths() {
        // A bare file name stages in the current directory; no directory
        // change is needed to exercise this branch.
        let staged = stage_sink(Path::new("bare-name.out")).unwrap();
        assert_eq!(staged.path().parent().unwrap(), Path::new("."));
        let staged_path = staged.path().to_path_buf();
        drop(staged);
        assert!(!staged_path.exists());
    }

    #[test]
    fn test_wrong_store_password_reported() {
        let dir = tempfile::tempdir().unwrap();
        let store_path = saved_store(dir.path(), "alice", &[]);
        let mut args = message_args(
            None,
            &dir.path().join("in"),
            &dir.path().join("out"),
            &store_path,
        );
        args.store_pass = "wrong".to_string();
        let err = run_message(&args).unwrap_err();
        assert!(format!("{err:#}").contains("opening keystore"));
    }

    #[test]
    fn test_invalid_recipient_identifier_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store_path = saved_store(dir.path(), "alice", &[]);
        let plaintext = dir.path().join("letter.txt");
        std::fs::write(&plaintext, b"hello").unwrap();
        let args = message_args(
            Some("no spaces allowed"),
            &plaintext,
            &dir.path().join("out"),
            &store_path,
        );
        let err = run_message(&args).unwrap_err();
        assert!(format!("{err:#}").contains("invalid recipient identifier"));
    }

    #[test]
    fn test_invalid_remote_endpoint_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store_path = saved_store(dir.path(), "alice", &[]);
        let plaintext = dir.path().join("letter.txt");
        std::fs::write(&plaintext, b"hello").unwrap();
        let mut args = message_args(
            Some("bob"),
            &plaintext,
            &dir.path().join("out"),
            &store_path,
        );
        args.remote = Some("not a url".to_string());
        let err = run_message(&args).unwrap_err();
        assert!(format!("{err:#}").contains("invalid remote directory endpoint"));
    }
}
