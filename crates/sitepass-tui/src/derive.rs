use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;
use sitepass_core::SitepassResult;
use sitepass_crypto::pipeline::joined;
use sitepass_crypto::{Derivation, Generator, SiteRequest};
use tokio::sync::mpsc;
use tracing::debug;

pub enum AppEvent {
    Verification(SitepassResult<Derivation>),
    Site(SitepassResult<Derivation>),
    Tick,
}

/// Start both derivations. Each result is sent as soon as it is ready, so
/// the verification code usually lands before the site password.
pub fn spawn_generation(
    generator: &Generator,
    master: Arc<SecretString>,
    request: SiteRequest,
    tx: mpsc::Sender<AppEvent>,
) {
    debug!(host = %request.hostname, length = request.length, "generation started");

    let verification = generator.spawn_verification(Arc::clone(&master), request.salt.clone());
    let site = generator.spawn_site(master, request);

    let verification_tx = tx.clone();
    tokio::spawn(async move {
        let result = joined(verification.await);
        let _ = verification_tx.send(AppEvent::Verification(result)).await;
    });
    tokio::spawn(async move {
        let result = joined(site.await);
        let _ = tx.send(AppEvent::Site(result)).await;
    });
}

/// Send a `Tick` every `period` until the receiver goes away.
pub async fn ticker(period: Duration, tx: mpsc::Sender<AppEvent>) {
    let mut interval = tokio::time::interval(period);
    interval.tick().await;
    loop {
        interval.tick().await;
        if tx.send(AppEvent::Tick).await.is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitepass_core::Charset;
    use sitepass_crypto::KdfParams;

    #[tokio::test]
    async fn test_spawn_generation_delivers_both_results() {
        let generator = Generator::new(
            KdfParams::Scrypt {
                log_n: 8,
                r: 8,
                p: 1,
            },
            128,
        );
        let (tx, mut rx) = mpsc::channel(4);
        let request = SiteRequest {
            salt: "pepper".into(),
            hostname: "example.com".into(),
            alphabet: Charset::Digits.alphabet(),
            length: 12,
        };
        spawn_generation(
            &generator,
            Arc::new(SecretString::from("correct horse")),
            request,
            tx,
        );

        let mut verification = None;
        let mut site = None;
        for _ in 0..2 {
            match rx.recv().await.unwrap() {
                AppEvent::Verification(r) => verification = Some(r.unwrap()),
                AppEvent::Site(r) => site = Some(r.unwrap()),
                AppEvent::Tick => unreachable!(),
            }
        }
        assert_eq!(verification.unwrap().passcode.symbol_count(), 3);
        assert_eq!(site.unwrap().passcode.symbol_count(), 12);
    }

    #[tokio::test]
    async fn test_ticker_stops_when_receiver_dropped() {
        let (tx, mut rx) = mpsc::channel(1);
        let handle = tokio::spawn(ticker(Duration::from_millis(5), tx));

        assert!(matches!(rx.recv().await, Some(AppEvent::Tick)));
        drop(rx);
        handle.await.unwrap();
    }
}
