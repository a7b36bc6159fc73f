//! `BenefitsService`: the consumer layer every screen and command goes
//! through.
//!
//! A service is bound to one backend and one logged-in account for the
//! lifetime of a session. It applies the access policy, scoping and status
//! rules around each backend call, and re-fetches after every mutation.

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::{
  Error, Result,
  account::{Account, AccountId},
  age::AgeRange,
  backend::BenefitsBackend,
  beneficiary::Beneficiary,
  dependent::Dependent,
  policy::{
    Scope, authorize, authorize_account_admin, authorize_account_self_or_admin,
    authorize_dependent, scope_for,
  },
  report::{self, AgeRangeReport, HouseholdReport, ReportSubject, ReportTarget, SaleReport},
  role::{Actor, Role},
  scope::{BeneficiaryQuery, shape},
  status::{StatusChange, StatusTransition},
  street::{self, Street, StreetId},
  validate::{
    AccountDraft, BeneficiaryDraft, DependentDraft, FieldError, PasswordDraft, ValidationErrors,
    normalize_cedula,
  },
};

// ─── Results ─────────────────────────────────────────────────────────────────

/// Outcome of registering a beneficiary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
  /// The record as re-read from the backend.
  pub beneficiary: Beneficiary,
  /// Present when the operator said the household has dependents: a
  /// dependent form pre-filled with the new beneficiary's cédula.
  pub follow_up:   Option<DependentDraft>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusOutcome {
  pub beneficiary: Beneficiary,
  pub transition:  StatusTransition,
}

/// A dependent with its resolved parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependentDetail {
  pub dependent: Dependent,
  pub parent:    Beneficiary,
}

// ─── Service ─────────────────────────────────────────────────────────────────

pub struct BenefitsService<B> {
  backend: B,
  account: Account,
  actor:   Actor,
}

impl<B: BenefitsBackend> BenefitsService<B> {
  pub fn new(backend: B, account: Account) -> Self {
    let actor = Actor::from(&account);
    Self { backend, account, actor }
  }

  pub fn actor(&self) -> &Actor { &self.actor }

  pub fn account(&self) -> &Account { &self.account }

  pub fn backend(&self) -> &B { &self.backend }

  // ── Beneficiaries ─────────────────────────────────────────────────────

  /// Fetch, scope, then filter by `query`.
  pub async fn beneficiaries(&self, query: &BeneficiaryQuery) -> Result<Vec<Beneficiary>> {
    // Fail before the round trip when the actor has no scope at all.
    scope_for(&self.actor).inspect_err(|e| warn!(actor = ?self.actor, "denied: {e}"))?;
    let all = self.backend.list_beneficiaries().await.map_err(Error::backend)?;
    Ok(shape(&self.actor, all, query)?)
  }

  pub async fn active_beneficiaries(&self, text: Option<&str>) -> Result<Vec<Beneficiary>> {
    self
      .beneficiaries(&BeneficiaryQuery::active().with_text(text.unwrap_or_default()))
      .await
  }

  pub async fn inactive_beneficiaries(&self, text: Option<&str>) -> Result<Vec<Beneficiary>> {
    self
      .beneficiaries(&BeneficiaryQuery::inactive().with_text(text.unwrap_or_default()))
      .await
  }

  /// A single beneficiary the actor may access.
  pub async fn beneficiary(&self, cedula: &str) -> Result<Beneficiary> {
    let b = self.fetch_beneficiary(cedula).await?;
    authorize(&self.actor, &b).inspect_err(|e| warn!(cedula, "denied: {e}"))?;
    Ok(b)
  }

  async fn fetch_beneficiary(&self, cedula: &str) -> Result<Beneficiary> {
    let cedula = normalize_cedula(cedula);
    self
      .backend
      .get_beneficiary(&cedula)
      .await
      .map_err(Error::backend)?
      .ok_or(Error::BeneficiaryNotFound(cedula))
  }

  /// Register a new beneficiary. A street chief may only register on their
  /// own street.
  pub async fn register_beneficiary(
    &self,
    draft: &BeneficiaryDraft,
    has_dependents: bool,
    today: NaiveDate,
  ) -> Result<Registration> {
    let new = draft.to_new(today)?;
    authorize(&self.actor, &new)?;
    let cedula = new.cedula.clone();
    self.backend.create_beneficiary(new).await.map_err(Error::backend)?;
    info!(cedula, "beneficiary registered");

    let beneficiary = self.fetch_beneficiary(&cedula).await?;
    let follow_up = has_dependents.then(|| DependentDraft::for_beneficiary(&cedula));
    Ok(Registration { beneficiary, follow_up })
  }

  /// Edit every field but the cédula. Moving a beneficiary to a street the
  /// actor cannot see is refused.
  pub async fn update_beneficiary(
    &self,
    cedula: &str,
    draft: &BeneficiaryDraft,
    today: NaiveDate,
  ) -> Result<Beneficiary> {
    let cedula = normalize_cedula(cedula);
    let cedula = cedula.as_str();
    ensure_same_cedula(cedula, &draft.cedula)?;
    let current = self.beneficiary(cedula).await?;
    let update = draft.to_update(today)?;
    if update.street_id != current.street_id {
      let mut moved = current.clone();
      moved.street_id = update.street_id;
      authorize(&self.actor, &moved)?;
    }
    self
      .backend
      .update_beneficiary(cedula, update)
      .await
      .map_err(Error::backend)?;
    info!(cedula, "beneficiary updated");
    self.fetch_beneficiary(cedula).await
  }

  /// Apply a status change. A change to the current state is a no-op that
  /// reports an unchanged transition.
  pub async fn change_status(&self, cedula: &str, change: StatusChange) -> Result<StatusOutcome> {
    let current = self.beneficiary(cedula).await?;
    let transition = current.status.apply(change);
    if !transition.changed() {
      debug!(cedula, verb = change.verb(), "status already {}", transition.to);
      return Ok(StatusOutcome { beneficiary: current, transition });
    }
    self
      .backend
      .set_beneficiary_status(cedula, transition.to)
      .await
      .map_err(Error::backend)?;
    info!(cedula, from = %transition.from, to = %transition.to, "beneficiary status changed");
    let beneficiary = self.fetch_beneficiary(cedula).await?;
    Ok(StatusOutcome { beneficiary, transition })
  }

  pub async fn disable(&self, cedula: &str) -> Result<StatusOutcome> {
    self.change_status(cedula, StatusChange::Disable).await
  }

  pub async fn reactivate(&self, cedula: &str) -> Result<StatusOutcome> {
    self.change_status(cedula, StatusChange::Reactivate).await
  }

  // ── Dependents ────────────────────────────────────────────────────────

  /// Dependents of a household the actor may access.
  pub async fn dependents_of(&self, beneficiary_cedula: &str) -> Result<Vec<Dependent>> {
    let parent = self.beneficiary(beneficiary_cedula).await?;
    let mut dependents = self
      .backend
      .list_dependents(&parent.cedula)
      .await
      .map_err(Error::backend)?;
    dependents.retain(|d| d.beneficiary_cedula == parent.cedula);
    Ok(dependents)
  }

  /// Resolve a dependent and its parent, then authorize through the parent.
  pub async fn dependent(&self, cedula: &str) -> Result<DependentDetail> {
    let cedula = normalize_cedula(cedula);
    let dependent = self
      .backend
      .get_dependent(&cedula)
      .await
      .map_err(Error::backend)?
      .ok_or(Error::DependentNotFound(cedula))?;
    let parent = self.fetch_beneficiary(&dependent.beneficiary_cedula).await?;
    authorize_dependent(&self.actor, &dependent, &parent)?;
    Ok(DependentDetail { dependent, parent })
  }

  /// Register a dependent. The parent must exist and be accessible; a
  /// dependent is never sent for a missing beneficiary.
  pub async fn create_dependent(&self, draft: &DependentDraft, today: NaiveDate) -> Result<DependentDetail> {
    let new = draft.to_new(today)?;
    let parent = self
      .backend
      .get_beneficiary(&new.beneficiary_cedula)
      .await
      .map_err(Error::backend)?
      .ok_or_else(|| Error::OrphanDependent(new.beneficiary_cedula.clone()))?;
    authorize(&self.actor, &parent)?;

    let cedula = new.cedula.clone();
    self.backend.create_dependent(new).await.map_err(Error::backend)?;
    info!(cedula, beneficiary = parent.cedula, "dependent registered");
    self.dependent(&cedula).await
  }

  /// Edit every field but the cédula and the household.
  pub async fn update_dependent(
    &self,
    cedula: &str,
    draft: &DependentDraft,
    today: NaiveDate,
  ) -> Result<DependentDetail> {
    let cedula = normalize_cedula(cedula);
    let cedula = cedula.as_str();
    ensure_same_cedula(cedula, &draft.cedula)?;
    let current = self.dependent(cedula).await?;
    let update = draft.to_update(today)?;
    self
      .backend
      .update_dependent(&current.dependent.cedula, update)
      .await
      .map_err(Error::backend)?;
    info!(cedula, "dependent updated");
    self.dependent(cedula).await
  }

  /// Hard delete. Callers re-list the household afterwards.
  pub async fn delete_dependent(&self, cedula: &str) -> Result<()> {
    let current = self.dependent(cedula).await?;
    self
      .backend
      .delete_dependent(&current.dependent.cedula)
      .await
      .map_err(Error::backend)?;
    info!(cedula, beneficiary = current.parent.cedula, "dependent deleted");
    Ok(())
  }

  // ── Streets ───────────────────────────────────────────────────────────

  pub async fn streets(&self) -> Result<Vec<Street>> {
    self.backend.list_streets().await.map_err(Error::backend)
  }

  /// The actor's own street, for a street chief. `None` for leaders.
  pub async fn assigned_street(&self) -> Result<Option<Street>> {
    match scope_for(&self.actor)? {
      Scope::AllStreets => Ok(None),
      Scope::Street(id) => self.street(id).await.map(Some),
    }
  }

  async fn street(&self, id: StreetId) -> Result<Street> {
    let streets = self.streets().await?;
    street::find(&streets, id).cloned().ok_or_else(|| {
      warn!(street_id = id, "street missing from /api/calles");
      Error::UnknownStreet(id)
    })
  }

  async fn subject_for(&self, target: ReportTarget) -> Result<ReportSubject> {
    match target {
      ReportTarget::Community => Ok(ReportSubject::Community),
      ReportTarget::Street(id) => Ok(ReportSubject::Street(self.street(id).await?)),
    }
  }

  // ── Reports ───────────────────────────────────────────────────────────

  /// General export: every active household in the resolved target.
  pub async fn family_burden_report(&self, target: ReportTarget) -> Result<HouseholdReport> {
    let target = report::resolve_target(&self.actor, target)?;
    let subject = self.subject_for(target).await?;
    let rows = self.backend.family_burden(None).await.map_err(Error::backend)?;
    Ok(report::family_burden(&self.actor, rows, target, subject)?)
  }

  /// Family burden of one beneficiary.
  pub async fn family_burden_of(&self, cedula: &str) -> Result<HouseholdReport> {
    let cedula = normalize_cedula(cedula);
    let cedula = cedula.as_str();
    let rows = self
      .backend
      .family_burden(Some(cedula))
      .await
      .map_err(Error::backend)?;
    let household = rows
      .into_iter()
      .find(|h| h.beneficiary.cedula == cedula)
      .ok_or_else(|| Error::BeneficiaryNotFound(cedula.to_owned()))?;
    Ok(report::family_burden_of(&self.actor, household)?)
  }

  /// Households on one street. `None` asks for every street in scope.
  pub async fn street_habitants_report(&self, street_id: Option<StreetId>) -> Result<HouseholdReport> {
    let requested = street_id.map_or(ReportTarget::Community, ReportTarget::Street);
    let target = report::resolve_target(&self.actor, requested)?;
    let subject = self.subject_for(target).await?;
    let backend_street = match target {
      ReportTarget::Street(id) => Some(id),
      ReportTarget::Community => None,
    };
    let rows = self
      .backend
      .street_habitants(backend_street)
      .await
      .map_err(Error::backend)?;
    Ok(report::street_habitants(&self.actor, rows, target, subject)?)
  }

  pub async fn age_range_report(
    &self,
    range: AgeRange,
    today: NaiveDate,
    target: ReportTarget,
  ) -> Result<AgeRangeReport> {
    let target = report::resolve_target(&self.actor, target)?;
    let subject = self.subject_for(target).await?;
    let mut rows = self
      .backend
      .age_range(range.min(), range.max())
      .await
      .map_err(Error::backend)?;
    let unplaced = rows.iter().filter(|p| p.street_id.is_none()).count();
    if unplaced > 0 {
      debug!(unplaced, "age range rows without a street, joining households");
      let households = self.backend.list_beneficiaries().await.map_err(Error::backend)?;
      report::resolve_entry_streets(&mut rows, &households);
    }
    Ok(report::age_range(&self.actor, rows, range, today, target, subject)?)
  }

  pub async fn sale_report(&self, target: ReportTarget) -> Result<SaleReport> {
    let target = report::resolve_target(&self.actor, target)?;
    let subject = self.subject_for(target).await?;
    let rows = self.backend.family_burden(None).await.map_err(Error::backend)?;
    Ok(report::sale(&self.actor, rows, target, subject)?)
  }

  // ── Accounts ──────────────────────────────────────────────────────────

  pub async fn accounts(&self) -> Result<Vec<Account>> {
    authorize_account_admin(&self.actor)?;
    self.backend.list_accounts().await.map_err(Error::backend)
  }

  pub async fn account_by_id(&self, id: AccountId) -> Result<Account> {
    authorize_account_self_or_admin(&self.actor, self.account.id, id)?;
    self
      .backend
      .get_account(id)
      .await
      .map_err(Error::backend)?
      .ok_or_else(|| Error::AccountNotFound(id.to_string()))
  }

  /// Create a street-chief account. Whatever role the draft carried, the
  /// request always goes out as role 2.
  pub async fn register_account(&self, draft: &AccountDraft) -> Result<Account> {
    authorize_account_admin(&self.actor)?;
    let mut new = draft.to_new()?;
    new.role_id = Role::STREET_CHIEF_ID;
    let username = new.username.clone();
    self.backend.register_account(new).await.map_err(Error::backend)?;
    info!(username, "account registered");

    self
      .backend
      .list_accounts()
      .await
      .map_err(Error::backend)?
      .into_iter()
      .find(|a| a.username == username)
      .ok_or(Error::AccountNotFound(username))
  }

  /// Edit an account. Only a leader may change the assigned street.
  pub async fn update_account(&self, id: AccountId, draft: &AccountDraft) -> Result<Account> {
    let current = self.account_by_id(id).await?;
    let mut update = draft.to_update(id)?;
    if !self.actor.is_leader() {
      update.assigned_street_id = current.assigned_street_id;
    }
    self.backend.update_account(update).await.map_err(Error::backend)?;
    info!(id, "account updated");
    self.account_by_id(id).await
  }

  /// Self-service profile edit.
  pub async fn update_profile(&self, draft: &AccountDraft) -> Result<Account> {
    self.update_account(self.account.id, draft).await
  }

  /// Change the logged-in account's own password.
  pub async fn change_password(&self, draft: &PasswordDraft) -> Result<()> {
    let change = draft.to_change(self.account.id)?;
    self.backend.change_password(change).await.map_err(Error::backend)?;
    info!(id = self.account.id, "password changed");
    Ok(())
  }

  pub async fn delete_account(&self, id: AccountId) -> Result<()> {
    authorize_account_admin(&self.actor)?;
    if id == self.account.id {
      return Err(
        ValidationErrors::from(vec![FieldError::new("id", "cannot delete the account in use")]).into(),
      );
    }
    self.backend.delete_account(id).await.map_err(Error::backend)?;
    info!(id, "account deleted");
    Ok(())
  }
}

/// Forms may echo the cédula back; it must match the record being edited.
/// `cedula` is already normalized.
fn ensure_same_cedula(cedula: &str, submitted: &str) -> Result<()> {
  let submitted = normalize_cedula(submitted);
  if submitted.is_empty() || submitted == cedula {
    Ok(())
  } else {
    Err(Error::ImmutableCedula(cedula.to_owned()))
  }
}
