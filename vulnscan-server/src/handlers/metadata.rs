//! Scanner adapter metadata.
//!
//! Properties are assembled in two layers. The static layer echoes build
//! facts and engine configuration and is always complete. The engine layer
//! adds database freshness when the version query succeeds; when it fails
//! those keys are left out and the response is still `200 OK`.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::warn;

use vulnscan_model::{
    Capability, Properties, Scanner, ScannerAdapterMetadata, VersionInfo,
    mime, version::format_timestamp,
};

use crate::{
    infra::{
        app_state::AppState,
        build_info::{BuildInfo, SOURCE_URL},
        config::TrivyConfig,
    },
    responses::VendorJson,
};

pub const PROPERTY_SCANNER_TYPE: &str = "harbor.scanner-adapter/scanner-type";
pub const PROPERTY_DB_UPDATED_AT: &str =
    "harbor.scanner-adapter/vulnerability-database-updated-at";
pub const PROPERTY_DB_NEXT_UPDATE_AT: &str =
    "harbor.scanner-adapter/vulnerability-database-next-update-at";
pub const PROPERTY_JAVA_DB_NEXT_UPDATE_AT: &str =
    "harbor.scanner-adapter/vulnerability-java-database-next-update-at";

const SCANNER_TYPE: &str = "os-package-vulnerability";
const SCANNER_NAME: &str = "Trivy";
const SCANNER_VENDOR: &str = "Aqua Security";

/// `GET /api/v1/metadata`
pub async fn get_metadata_handler(State(state): State<AppState>) -> Response {
    let version = match state.version_provider.version().await {
        Ok(version) => Some(version),
        Err(err) => {
            warn!(error = %err, "failed to query vulnerability database version");
            None
        }
    };

    let metadata =
        build_metadata(&state.config.trivy, &state.build_info, version.as_ref());

    VendorJson::new(StatusCode::OK, &mime::METADATA, metadata).into_response()
}

pub fn build_metadata(
    config: &TrivyConfig,
    build: &BuildInfo,
    version: Option<&VersionInfo>,
) -> ScannerAdapterMetadata {
    let mut properties = static_properties(config, build);
    if let Some(version) = version {
        apply_engine_version(&mut properties, config, version);
    }

    ScannerAdapterMetadata {
        scanner: Scanner {
            name: SCANNER_NAME.to_string(),
            vendor: SCANNER_VENDOR.to_string(),
            version: config.version.clone(),
        },
        capabilities: vec![Capability {
            consumes_mime_types: vec![
                mime::OCI_IMAGE_MANIFEST.to_string(),
                mime::DOCKER_IMAGE_MANIFEST_V2.to_string(),
            ],
            produces_mime_types: vec![
                mime::SECURITY_VULNERABILITY_REPORT.to_string(),
            ],
        }],
        properties,
    }
}

pub fn static_properties(config: &TrivyConfig, build: &BuildInfo) -> Properties {
    let mut properties = Properties::new();
    properties.insert(PROPERTY_SCANNER_TYPE, SCANNER_TYPE);

    properties.insert("org.label-schema.version", &build.version);
    properties.insert("org.label-schema.build-date", &build.date);
    properties.insert("org.label-schema.vcs-ref", &build.commit);
    properties.insert("org.label-schema.vcs", SOURCE_URL);

    properties.insert(
        "env.SCANNER_TRIVY_SKIP_UPDATE",
        config.skip_update.to_string(),
    );
    properties.insert(
        "env.SCANNER_TRIVY_SKIP_JAVA_DB_UPDATE",
        config.skip_java_db_update.to_string(),
    );
    properties.insert(
        "env.SCANNER_TRIVY_OFFLINE_SCAN",
        config.offline_scan.to_string(),
    );
    properties.insert(
        "env.SCANNER_TRIVY_IGNORE_UNFIXED",
        config.ignore_unfixed.to_string(),
    );
    properties.insert("env.SCANNER_TRIVY_DEBUG_MODE", config.debug_mode.to_string());
    properties.insert("env.SCANNER_TRIVY_INSECURE", config.insecure.to_string());
    properties.insert("env.SCANNER_TRIVY_VULN_TYPE", &config.vuln_type);
    properties.insert("env.SCANNER_TRIVY_SECURITY_CHECKS", &config.security_checks);
    properties.insert("env.SCANNER_TRIVY_SEVERITY", &config.severity);
    properties.insert("env.SCANNER_TRIVY_TIMEOUT", config.timeout_display());

    properties
}

pub fn apply_engine_version(
    properties: &mut Properties,
    config: &TrivyConfig,
    version: &VersionInfo,
) {
    if let Some(db) = &version.vulnerability_db {
        properties.insert(PROPERTY_DB_UPDATED_AT, format_timestamp(&db.updated_at));
        if !config.skip_update {
            properties.insert(
                PROPERTY_DB_NEXT_UPDATE_AT,
                format_timestamp(&db.next_update),
            );
        }
    }

    if let Some(java_db) = &version.java_db
        && !config.skip_java_db_update
    {
        properties.insert(
            PROPERTY_JAVA_DB_NEXT_UPDATE_AT,
            format_timestamp(&java_db.next_update),
        );
    }
}
