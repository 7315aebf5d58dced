//! Upstream HTTP client construction
//!
//! One client per upstream, built at startup from that upstream's TLS
//! settings and injected into its [`Forwarder`](crate::gateway::Forwarder).
//! The legacy hyper client never follows redirects, which the relay
//! relies on: a 3xx from upstream is handed back to the caller as-is.

use axum::body::Body;
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use rustls::RootCertStore;
use std::io::BufReader;
use std::sync::Arc;

use crate::config::UpstreamTlsConfig;
use crate::gateway::types::{GatewayError, GatewayResult};

/// The outbound HTTP client shared by all requests of one upstream
pub type UpstreamClient = Client<HttpsConnector<HttpConnector>, Body>;

/// Build an upstream client honoring the upstream's TLS overrides.
///
/// - default: validate against the platform's native roots;
/// - `ca_certificate_path`: validate against that CA bundle only;
/// - `verify_certificate = false`: accept any certificate (testing
///   escape hatch).
pub fn build_client(tls: &UpstreamTlsConfig) -> GatewayResult<UpstreamClient> {
    let connector = if !tls.verify_certificate {
        let config = rustls::ClientConfig::builder()
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(NoVerification))
            .with_no_client_auth();
        HttpsConnectorBuilder::new()
            .with_tls_config(config)
            .https_or_http()
            .enable_http1()
            .build()
    } else if let Some(path) = &tls.ca_certificate_path {
        let file = std::fs::File::open(path)
            .map_err(|e| GatewayError::Tls(format!("cannot open CA bundle {path:?}: {e}")))?;
        let mut reader = BufReader::new(file);
        let mut roots = RootCertStore::empty();
        for cert in rustls_pemfile::certs(&mut reader) {
            let cert = cert
                .map_err(|e| GatewayError::Tls(format!("cannot parse CA bundle {path:?}: {e}")))?;
            roots
                .add(cert)
                .map_err(|e| GatewayError::Tls(format!("rejected CA certificate: {e}")))?;
        }
        let config = rustls::ClientConfig::builder()
            .with_root_certificates(roots)
            .with_no_client_auth();
        HttpsConnectorBuilder::new()
            .with_tls_config(config)
            .https_or_http()
            .enable_http1()
            .build()
    } else {
        HttpsConnectorBuilder::new()
            .with_native_roots()
            .map_err(|e| GatewayError::Tls(format!("cannot load native roots: {e}")))?
            .https_or_http()
            .enable_http1()
            .build()
    };

    Ok(Client::builder(TokioExecutor::new())
        .http1_title_case_headers(true)
        .http1_preserve_header_case(true)
        .build(connector))
}

/// Certificate verifier that accepts all certificates without validation.
#[derive(Debug)]
struct NoVerification;

impl rustls::client::danger::ServerCertVerifier for NoVerification {
    fn verify_server_cert(
        &self,
        _end_entity: &rustls::pki_types::CertificateDer<'_>,
        _intermediates: &[rustls::pki_types::CertificateDer<'_>],
        _server_name: &rustls::pki_types::ServerName<'_>,
        _ocsp_response: &[u8],
        _now: rustls::pki_types::UnixTime,
    ) -> Result<rustls::client::danger::ServerCertVerified, rustls::Error> {
        Ok(rustls::client::danger::ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &rustls::pki_types::CertificateDer<'_>,
        _dss: &rustls::DigitallySignedStruct,
    ) -> Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
        Ok(rustls::client::danger::HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &rustls::pki_types::CertificateDer<'_>,
        _dss: &rustls::DigitallySignedStruct,
    ) -> Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
        Ok(rustls::client::danger::HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<rustls::SignatureScheme> {
        rustls::crypto::ring::default_provider()
            .signature_verification_algorithms
            .supported_schemes()
    }
}
