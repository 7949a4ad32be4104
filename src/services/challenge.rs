use async_trait::async_trait;
use ring::digest;
use secrecy::{ExposeSecret, Secret};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncWrite, AsyncWriteExt, Lines};
use tokio::sync::Mutex;

#[derive(thiserror::Error, Debug)]
pub enum ChallengeError {
    #[error("No device credential is enrolled")]
    NotEnrolled,

    #[error("Challenge was cancelled")]
    Cancelled,

    #[error("Platform error: {0}")]
    Platform(String),
}

/// Outcome of a completed challenge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChallengeResult {
    pub success: bool,
}

/// A biometric or device-credential prompt.
#[async_trait]
pub trait Challenger: Send + Sync {
    async fn challenge(&self, prompt: &str) -> Result<ChallengeResult, ChallengeError>;
}

/// Line source shared between a challenger and whatever else reads input.
pub type SharedLines<R> = Arc<Mutex<Lines<R>>>;

/// Challenges by asking for a credential on a line-oriented input.
///
/// The typed line is compared by SHA-256 digest against the enrolled
/// credential.
pub struct CredentialChallenger<R, W> {
    enrolled: Option<[u8; 32]>,
    input: SharedLines<R>,
    output: Mutex<W>,
}

impl<R, W> CredentialChallenger<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(credential: Option<&Secret<String>>, input: SharedLines<R>, output: W) -> Self {
        Self {
            enrolled: credential.map(|c| fingerprint(c.expose_secret())),
            input,
            output: Mutex::new(output),
        }
    }

    async fn write_prompt(&self, prompt: &str) -> Result<(), ChallengeError> {
        let mut output = self.output.lock().await;
        output
            .write_all(format!("{}: ", prompt).as_bytes())
            .await
            .map_err(|e| ChallengeError::Platform(e.to_string()))?;
        output
            .flush()
            .await
            .map_err(|e| ChallengeError::Platform(e.to_string()))
    }
}

#[async_trait]
impl<R, W> Challenger for CredentialChallenger<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn challenge(&self, prompt: &str) -> Result<ChallengeResult, ChallengeError> {
        let enrolled = self.enrolled.ok_or(ChallengeError::NotEnrolled)?;

        self.write_prompt(prompt).await?;

        let line = self
            .input
            .lock()
            .await
            .next_line()
            .await
            .map_err(|e| ChallengeError::Platform(e.to_string()))?
            .ok_or(ChallengeError::Cancelled)?;

        let attempt = fingerprint(line.trim_end_matches('\r'));
        Ok(ChallengeResult {
            success: digests_match(&attempt, &enrolled),
        })
    }
}

fn fingerprint(credential: &str) -> [u8; 32] {
    let hash = digest::digest(&digest::SHA256, credential.as_bytes());
    let mut out = [0u8; 32];
    out.copy_from_slice(hash.as_ref());
    out
}

fn digests_match(a: &[u8; 32], b: &[u8; 32]) -> bool {
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
