use crate::domain::schedule::field_name;
use crate::domain::{Caller, Recurser, RecurserStore, StoreError, Subscription};
use anyhow::Context;
use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use chrono::Weekday;
use serde_dynamo::aws_sdk_dynamodb_1::{from_item, to_attribute_value};
use std::collections::HashMap;

const RECORD_TYPE: &str = "Recurser";

type Item = HashMap<String, AttributeValue>;

/// Subscriber records in a single DynamoDB table, one item per subscriber
/// keyed by `PK` = chat platform user id.
#[derive(Debug, Clone)]
pub struct DynamoDbRecurserStore {
    client: Client,
    table_name: String,
}

impl DynamoDbRecurserStore {
    pub fn new(client: Client, table_name: String) -> Self {
        Self { client, table_name }
    }

    async fn scan(
        &self,
        filter: &str,
        names: &[(&str, &str)],
        values: &[(&str, AttributeValue)],
    ) -> Result<Vec<Recurser>, StoreError> {
        let mut request = self
            .client
            .scan()
            .table_name(&self.table_name)
            .filter_expression(format!("#type = :type AND ({})", filter))
            .expression_attribute_names("#type", "Type")
            .expression_attribute_values(":type", AttributeValue::S(RECORD_TYPE.to_string()));
        for (placeholder, name) in names {
            request = request.expression_attribute_names(*placeholder, *name);
        }
        for (placeholder, value) in values {
            request = request.expression_attribute_values(*placeholder, value.clone());
        }

        let items: Vec<Item> = request
            .into_paginator()
            .items()
            .send()
            .try_collect()
            .await
            .context(format!("Failure scanning DynamoDB table {}", &self.table_name))?;

        Ok(parse_items(items))
    }
}

/// Parses scanned items, dropping the ones that do not hold a valid record.
fn parse_items(items: Vec<Item>) -> Vec<Recurser> {
    items
        .into_iter()
        .filter_map(|item| match recurser_from_item(item) {
            Ok(recurser) => Some(recurser),
            Err(error) => {
                tracing::warn!(
                    error.cause_chain = ?error,
                    error.message = %error,
                    "Skipping a stored subscriber. The record is malformed",
                );
                None
            }
        })
        .collect()
}

fn recurser_from_item(item: Item) -> Result<Recurser, StoreError> {
    let key = item
        .get("PK")
        .and_then(|pk| pk.as_s().ok())
        .cloned()
        .unwrap_or_default();

    from_item(item).map_err(|e| StoreError::MalformedRecord(format!("record {}: {}", key, e)))
}

/// Values written by a merge upsert. Attributes outside this set are left
/// as they are on the stored item.
fn update_values(recurser: &Recurser) -> Result<Vec<(&'static str, &'static str, AttributeValue)>, StoreError> {
    let schedule: AttributeValue = to_attribute_value(recurser.schedule)
        .context("Failed to convert a schedule to a DynamoDB attribute")?;

    Ok(vec![
        ("#type", "Type", AttributeValue::S(RECORD_TYPE.to_string())),
        ("#id", "id", AttributeValue::S(recurser.id.clone())),
        ("#name", "name", AttributeValue::S(recurser.name.clone())),
        ("#email", "email", AttributeValue::S(recurser.email.clone())),
        (
            "#skip",
            "isSkippingTomorrow",
            AttributeValue::Bool(recurser.is_skipping_tomorrow),
        ),
        ("#schedule", "schedule", schedule),
    ])
}

#[async_trait]
impl RecurserStore for DynamoDbRecurserStore {
    #[tracing::instrument(skip(self, caller), fields(recurser_id = %caller.id))]
    async fn get_by_id(&self, caller: &Caller) -> Result<Subscription, StoreError> {
        let response = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("PK", AttributeValue::S(caller.id.clone()))
            .consistent_read(true)
            .send()
            .await
            .context(format!(
                "Failure reading record from DynamoDB. Using table {}",
                &self.table_name
            ))?;

        match response.item {
            Some(item) => {
                let mut recurser = recurser_from_item(item)?;
                recurser.name = caller.name.clone();
                recurser.email = caller.email.clone();
                Ok(Subscription::Subscribed(recurser))
            }
            None => Ok(Subscription::NotSubscribed(Recurser::new_subscriber(caller))),
        }
    }

    #[tracing::instrument(skip(self, recurser), fields(recurser_id = %recurser.id))]
    async fn set(&self, recurser: &Recurser) -> Result<(), StoreError> {
        let values = update_values(recurser)?;

        let assignments: Vec<String> = values
            .iter()
            .map(|(placeholder, _, _)| format!("{} = :{}", placeholder, &placeholder[1..]))
            .collect();

        let mut request = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key("PK", AttributeValue::S(recurser.id.clone()))
            .update_expression(format!("SET {}", assignments.join(", ")));
        for (placeholder, name, value) in values {
            request = request
                .expression_attribute_names(placeholder, name)
                .expression_attribute_values(format!(":{}", &placeholder[1..]), value);
        }

        request.send().await.context(format!(
            "Failure writing record to DynamoDB. Using table {}",
            &self.table_name
        ))?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, recurser_id: &str) -> Result<(), StoreError> {
        self.client
            .delete_item()
            .table_name(&self.table_name)
            .key("PK", AttributeValue::S(recurser_id.to_string()))
            .send()
            .await
            .context(format!(
                "Failure deleting record from DynamoDB. Using table {}",
                &self.table_name
            ))?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn get_all(&self) -> Result<Vec<Recurser>, StoreError> {
        self.scan("attribute_exists(#pk)", &[("#pk", "PK")], &[]).await
    }

    #[tracing::instrument(skip(self))]
    async fn list_eligible(&self, day: Weekday) -> Result<Vec<Recurser>, StoreError> {
        self.scan(
            "#skip = :false AND #schedule.#day = :true",
            &[
                ("#skip", "isSkippingTomorrow"),
                ("#schedule", "schedule"),
                ("#day", field_name(day)),
            ],
            &[
                (":false", AttributeValue::Bool(false)),
                (":true", AttributeValue::Bool(true)),
            ],
        )
        .await
    }

    #[tracing::instrument(skip(self))]
    async fn list_skipping_tomorrow(&self) -> Result<Vec<Recurser>, StoreError> {
        self.scan(
            "#skip = :true",
            &[("#skip", "isSkippingTomorrow")],
            &[(":true", AttributeValue::Bool(true))],
        )
        .await
    }

    #[tracing::instrument(skip(self, recurser), fields(recurser_id = %recurser.id))]
    async fn unset_skipping_tomorrow(&self, recurser: &Recurser) -> Result<(), StoreError> {
        let result = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key("PK", AttributeValue::S(recurser.id.clone()))
            .update_expression("SET #skip = :false")
            .condition_expression("attribute_exists(PK)")
            .expression_attribute_names("#skip", "isSkippingTomorrow")
            .expression_attribute_values(":false", AttributeValue::Bool(false))
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e)
                if e.as_service_error()
                    .map(|e| e.is_conditional_check_failed_exception())
                    .unwrap_or(false) =>
            {
                tracing::info!("Subscriber was removed before their skip flag was reset");
                Ok(())
            }
            Err(e) => Err(anyhow::Error::new(e)
                .context(format!(
                    "Failure resetting skip flag in DynamoDB. Using table {}",
                    &self.table_name
                ))
                .into()),
        }
    }
}
