//! Handlers for the `/forms` routes.

use crate::api::{with_conn, ApiError};
use crate::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Extension, Path, Query,
    },
    response::Json,
};
use quizhub_forms::{
    create_form, delete_form, get_form, list_forms, publish_form, update_form, ListParams,
};
use quizhub_types::{Form, FormCreate, FormSummary};
use serde_json::{json, Value};
use std::sync::Arc;

/// POST /forms
///
/// Stores the form and all of its questions atomically and echoes the
/// stored form back, ids included.
pub async fn create_form_handler(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<FormCreate>, JsonRejection>,
) -> Result<Json<Form>, ApiError> {
    let Json(payload) = payload?;

    let form = with_conn(&state.pool, "create_form", move |conn| {
        Ok(create_form(conn, &payload)?)
    })
    .await?;

    Ok(Json(form))
}

/// GET /forms
pub async fn list_forms_handler(
    Extension(state): Extension<Arc<AppState>>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<FormSummary>>, ApiError> {
    let Query(params) = params?;

    let forms = with_conn(&state.pool, "list_forms", move |conn| {
        Ok(list_forms(conn, &params)?)
    })
    .await?;

    Ok(Json(forms))
}

/// GET /forms/:formId
pub async fn get_form_handler(
    Extension(state): Extension<Arc<AppState>>,
    form_id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Form>, ApiError> {
    let Path(form_id) = form_id?;

    let form = with_conn(&state.pool, "get_form", move |conn| {
        Ok(get_form(conn, form_id)?)
    })
    .await?;

    Ok(Json(form))
}

/// PUT /forms/:formId
///
/// Replaces a draft's title, description and questions. Published forms
/// answer 409.
pub async fn update_form_handler(
    Extension(state): Extension<Arc<AppState>>,
    form_id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<FormCreate>, JsonRejection>,
) -> Result<Json<Form>, ApiError> {
    let Path(form_id) = form_id?;
    let Json(payload) = payload?;

    let form = with_conn(&state.pool, "update_form", move |conn| {
        Ok(update_form(conn, form_id, &payload)?)
    })
    .await?;

    Ok(Json(form))
}

/// POST /forms/:formId/publish
pub async fn publish_form_handler(
    Extension(state): Extension<Arc<AppState>>,
    form_id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Form>, ApiError> {
    let Path(form_id) = form_id?;

    let form = with_conn(&state.pool, "publish_form", move |conn| {
        Ok(publish_form(conn, form_id)?)
    })
    .await?;

    Ok(Json(form))
}

/// DELETE /forms/:formId
pub async fn delete_form_handler(
    Extension(state): Extension<Arc<AppState>>,
    form_id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Value>, ApiError> {
    let Path(form_id) = form_id?;

    with_conn(&state.pool, "delete_form", move |conn| {
        Ok(delete_form(conn, form_id)?)
    })
    .await?;

    Ok(Json(json!({"status": "deleted"})))
}
