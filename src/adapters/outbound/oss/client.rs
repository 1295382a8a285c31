use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE, DATE};
use reqwest::{Client, Method};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;

use super::error::OssError;
use super::signer::{self, OssCredentials, SignableRequest, SECURITY_TOKEN_HEADER};
use super::xml;
use crate::{
    domain::{
        errors::{GatewayError, GatewayOperation, GatewayResult},
        models::RemoteRuleSet,
        value_objects::BucketName,
    },
    ports::gateway::LifecycleGateway,
};

const LIFECYCLE: &str = "lifecycle";
const BUCKET_INFO: &str = "bucketInfo";
const XML_CONTENT_TYPE: &str = "application/xml";

/// Connection settings for an OSS region endpoint
#[derive(Debug, Clone)]
pub struct OssConfig {
    /// Region endpoint without scheme, e.g. `oss-cn-hangzhou.aliyuncs.com`
    pub endpoint: String,
    pub credentials: OssCredentials,
    pub use_https: bool,
    pub timeout: Duration,
}

impl OssConfig {
    pub fn new(endpoint: impl Into<String>, credentials: OssCredentials) -> Self {
        Self {
            endpoint: endpoint.into(),
            credentials,
            use_https: true,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Gateway speaking the OSS `?lifecycle` sub-resource over HTTP
#[derive(Debug, Clone)]
pub struct OssLifecycleGateway {
    client: Client,
    config: OssConfig,
}

impl OssLifecycleGateway {
    pub fn new(config: OssConfig) -> Result<Self, OssError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    fn url(&self, bucket: &BucketName, sub_resource: &str) -> String {
        let scheme = if self.config.use_https { "https" } else { "http" };
        format!(
            "{}://{}.{}/?{}",
            scheme, bucket, self.config.endpoint, sub_resource
        )
    }

    /// Sign and send one sub-resource request, returning the response body
    async fn send(
        &self,
        method: Method,
        bucket: &BucketName,
        sub_resource: &str,
        body: Option<String>,
    ) -> Result<String, OssError> {
        let date = signer::http_date(Utc::now());
        let content_md5 = body
            .as_deref()
            .map(|b| signer::content_md5(b.as_bytes()))
            .unwrap_or_default();
        let content_type = if body.is_some() { XML_CONTENT_TYPE } else { "" };
        let resource = format!("/{}/?{}", bucket, sub_resource);

        let mut oss_headers = BTreeMap::new();
        if let Some(token) = &self.config.credentials.security_token {
            oss_headers.insert(SECURITY_TOKEN_HEADER.to_string(), token.clone());
        }

        let signable = SignableRequest {
            method: method.as_str(),
            content_md5: &content_md5,
            content_type,
            date: &date,
            oss_headers,
            resource: &resource,
        };
        let authorization = signer::authorization(&self.config.credentials, &signable)?;

        let mut headers = HeaderMap::new();
        headers.insert(DATE, header_value(&date)?);
        headers.insert(AUTHORIZATION, header_value(&authorization)?);
        if !content_type.is_empty() {
            headers.insert(CONTENT_TYPE, header_value(content_type)?);
            headers.insert(
                HeaderName::from_static("content-md5"),
                header_value(&content_md5)?,
            );
        }
        for (name, value) in &signable.oss_headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| OssError::InvalidHeader(e.to_string()))?;
            headers.insert(name, header_value(value)?);
        }

        let mut request = self
            .client
            .request(method, self.url(bucket, sub_resource))
            .headers(headers);
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            Ok(text)
        } else {
            Err(OssError::from_response(status, &text))
        }
    }
}

fn header_value(value: &str) -> Result<HeaderValue, OssError> {
    HeaderValue::from_str(value).map_err(|e| OssError::InvalidHeader(e.to_string()))
}

#[async_trait]
impl LifecycleGateway for OssLifecycleGateway {
    async fn bucket_exists(&self, bucket: &BucketName) -> GatewayResult<bool> {
        let op = GatewayOperation::BucketExists;
        debug!(bucket = %bucket, operation = %op, "Calling OSS");

        match self.send(Method::GET, bucket, BUCKET_INFO, None).await {
            Ok(_) => Ok(true),
            Err(e) => match e.into_gateway_error(op, bucket) {
                GatewayError::NotFound { code, .. } if code == "NoSuchBucket" => Ok(false),
                other => Err(other),
            },
        }
    }

    async fn get_rules(&self, bucket: &BucketName) -> GatewayResult<RemoteRuleSet> {
        let op = GatewayOperation::GetRules;
        debug!(bucket = %bucket, operation = %op, "Calling OSS");

        let body = self
            .send(Method::GET, bucket, LIFECYCLE, None)
            .await
            .map_err(|e| e.into_gateway_error(op, bucket))?;
        xml::from_xml(&body).map_err(|e| e.into_gateway_error(op, bucket))
    }

    async fn replace_rules(&self, bucket: &BucketName, rules: &RemoteRuleSet) -> GatewayResult<()> {
        let op = GatewayOperation::ReplaceRules;
        debug!(bucket = %bucket, operation = %op, rules = rules.len(), "Calling OSS");

        let body = xml::to_xml(rules).map_err(|e| e.into_gateway_error(op, bucket))?;
        self.send(Method::PUT, bucket, LIFECYCLE, Some(body))
            .await
            .map_err(|e| e.into_gateway_error(op, bucket))?;
        Ok(())
    }

    async fn delete_all_rules(&self, bucket: &BucketName) -> GatewayResult<()> {
        let op = GatewayOperation::DeleteAllRules;
        debug!(bucket = %bucket, operation = %op, "Calling OSS");

        self.send(Method::DELETE, bucket, LIFECYCLE, None)
            .await
            .map_err(|e| e.into_gateway_error(op, bucket))?;
        Ok(())
    }
}
