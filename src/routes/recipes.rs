//! Handlers for listing, viewing, adding, editing and deleting recipes.
//!
//! Each handler performs one store operation. Writes redirect back to the list,
//! including updates and deletes of ids that do not exist.

use axum::{
    extract::{Path, State},
    response::{Html, Redirect},
    Extension, Form,
};
use tracing::instrument;

use super::{page_context, render};
use crate::error::{AppErrorResponse, ResultExt};
use crate::middleware::RequestId;
use crate::state::AppState;
use crate::store::{self, RecipeForm};

/// Recipe list page.
#[instrument(name = "recipes::index", skip(state, request_id))]
pub async fn index(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
) -> Result<Html<String>, AppErrorResponse> {
    let recipes = state.store.list().await.with_request_id(&request_id)?;

    let mut context = page_context(&state);
    context.insert("recipes", &recipes);

    render(&state, "index.html", &context).with_request_id(&request_id)
}

/// Edit form for one recipe. An unknown id renders the form without a recipe.
#[instrument(name = "recipes::edit", skip(state, request_id))]
pub async fn edit(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(id): Path<i32>,
) -> Result<Html<String>, AppErrorResponse> {
    let recipe = state.store.get(id).await.with_request_id(&request_id)?;
    if recipe.is_none() {
        tracing::debug!(id, "Recipe not found, rendering empty form");
    }

    let mut context = page_context(&state);
    context.insert("recipe_id", &id);
    context.insert("recipe", &recipe);

    render(&state, "edit_recipe.html", &context).with_request_id(&request_id)
}

/// Saves the edit form.
#[instrument(name = "recipes::update", skip(state, request_id, form))]
pub async fn update(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(id): Path<i32>,
    Form(form): Form<RecipeForm>,
) -> Result<Redirect, AppErrorResponse> {
    let changed = state
        .store
        .update(id, &form, store::now())
        .await
        .with_request_id(&request_id)?;

    if changed == 0 {
        tracing::debug!(id, "Update matched no recipe");
    } else {
        tracing::info!(id, "Recipe updated");
    }

    Ok(Redirect::to("/"))
}

/// Empty add form.
#[instrument(name = "recipes::new", skip(state, request_id))]
pub async fn new(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
) -> Result<Html<String>, AppErrorResponse> {
    let context = page_context(&state);
    render(&state, "add_recipe.html", &context).with_request_id(&request_id)
}

/// Saves the add form as a new recipe.
#[instrument(name = "recipes::create", skip(state, request_id, form))]
pub async fn create(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Form(form): Form<RecipeForm>,
) -> Result<Redirect, AppErrorResponse> {
    let id = state
        .store
        .create(&form, store::now())
        .await
        .with_request_id(&request_id)?;

    tracing::info!(id, title = %form.title, "Recipe created");
    Ok(Redirect::to("/"))
}

/// Deletes a recipe. Unknown ids are ignored.
#[instrument(name = "recipes::delete", skip(state, request_id))]
pub async fn delete(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(id): Path<i32>,
) -> Result<Redirect, AppErrorResponse> {
    let removed = state.store.delete(id).await.with_request_id(&request_id)?;
    tracing::info!(id, removed, "Recipe deleted");
    Ok(Redirect::to("/"))
}
