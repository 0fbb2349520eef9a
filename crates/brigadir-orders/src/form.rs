// SPDX-FileCopyrightText: 2026 Brigadir Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The guided order-creation form.
//!
//! Ten sequential steps: city -> date -> time -> address -> cleaning
//! type -> equipment -> conditions -> comment -> client contact ->
//! confirm. Each setter stores exactly one field and advances one step;
//! a setter called out of turn is rejected and changes nothing. Only
//! the comment step may be skipped. `back` maps every step to its
//! predecessor deterministically.

use brigadir_core::{
    BrigadirError, City, CleaningType, EquipmentOption, NewOrder, PaymentTerms,
};
use strum::{Display, EnumString};

/// Current position inside the guided form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum FormStep {
    City,
    Date,
    Time,
    Address,
    CleaningType,
    Equipment,
    Conditions,
    Comment,
    ClientContact,
    Confirm,
}

impl FormStep {
    /// The step `back` navigates to. `None` from the first step.
    pub fn back(self) -> Option<FormStep> {
        match self {
            Self::City => None,
            Self::Date => Some(Self::City),
            Self::Time => Some(Self::Date),
            Self::Address => Some(Self::Time),
            Self::CleaningType => Some(Self::Address),
            Self::Equipment => Some(Self::CleaningType),
            Self::Conditions => Some(Self::Equipment),
            Self::Comment => Some(Self::Conditions),
            Self::ClientContact => Some(Self::Comment),
            Self::Confirm => Some(Self::ClientContact),
        }
    }
}

/// Accumulated form state for one conversation.
///
/// Never persisted; lives in [`crate::FormSessions`] until confirm or
/// cancel tears it down.
#[derive(Debug, Clone)]
pub struct OrderForm {
    step: FormStep,
    pub city: Option<City>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub address: Option<String>,
    pub cleaning_type: Option<String>,
    pub equipment: Option<String>,
    pub conditions: Option<String>,
    pub comment: Option<String>,
    pub client_contact: Option<String>,
    /// Message id of the editable prompt, so selections rewrite one
    /// message instead of stacking new ones.
    pub prompt_message_id: Option<i32>,
}

impl Default for OrderForm {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderForm {
    pub fn new() -> Self {
        Self {
            step: FormStep::City,
            city: None,
            date: None,
            time: None,
            address: None,
            cleaning_type: None,
            equipment: None,
            conditions: None,
            comment: None,
            client_contact: None,
            prompt_message_id: None,
        }
    }

    /// The step currently awaiting input.
    pub fn step(&self) -> FormStep {
        self.step
    }

    fn expect_step(&self, expected: FormStep) -> Result<(), BrigadirError> {
        if self.step() != expected {
            return Err(BrigadirError::Validation(format!(
                "form is at step {}, not {}",
                self.step(),
                expected
            )));
        }
        Ok(())
    }

    pub fn set_city(&mut self, city: City) -> Result<(), BrigadirError> {
        self.expect_step(FormStep::City)?;
        self.city = Some(city);
        self.step = FormStep::Date;
        Ok(())
    }

    pub fn set_date(&mut self, date: String) -> Result<(), BrigadirError> {
        self.expect_step(FormStep::Date)?;
        self.date = Some(date);
        self.step = FormStep::Time;
        Ok(())
    }

    pub fn set_time(&mut self, time: String) -> Result<(), BrigadirError> {
        self.expect_step(FormStep::Time)?;
        self.time = Some(time);
        self.step = FormStep::Address;
        Ok(())
    }

    pub fn set_address(&mut self, address: String) -> Result<(), BrigadirError> {
        self.expect_step(FormStep::Address)?;
        self.address = Some(address);
        self.step = FormStep::CleaningType;
        Ok(())
    }

    pub fn set_cleaning_type(&mut self, kind: CleaningType) -> Result<(), BrigadirError> {
        self.expect_step(FormStep::CleaningType)?;
        self.cleaning_type = Some(kind.label().to_string());
        self.step = FormStep::Equipment;
        Ok(())
    }

    pub fn set_equipment(&mut self, option: EquipmentOption) -> Result<(), BrigadirError> {
        self.expect_step(FormStep::Equipment)?;
        self.equipment = Some(option.label().to_string());
        self.step = FormStep::Conditions;
        Ok(())
    }

    pub fn set_conditions(&mut self, terms: PaymentTerms) -> Result<(), BrigadirError> {
        self.expect_step(FormStep::Conditions)?;
        self.conditions = Some(terms.label().to_string());
        self.step = FormStep::Comment;
        Ok(())
    }

    pub fn set_comment(&mut self, comment: String) -> Result<(), BrigadirError> {
        self.expect_step(FormStep::Comment)?;
        self.comment = Some(comment);
        self.step = FormStep::ClientContact;
        Ok(())
    }

    /// Skip the optional comment. The only forward skip in the form.
    pub fn skip_comment(&mut self) -> Result<(), BrigadirError> {
        self.set_comment(String::new())
    }

    pub fn set_client_contact(&mut self, contact: String) -> Result<(), BrigadirError> {
        self.expect_step(FormStep::ClientContact)?;
        self.client_contact = Some(contact);
        self.step = FormStep::Confirm;
        Ok(())
    }

    /// Navigate one step back, keeping already-entered fields so moving
    /// forward again only requires re-entering the changed value.
    /// Returns the step to re-prompt, or `None` at the first step.
    pub fn go_back(&mut self) -> Option<FormStep> {
        let previous = self.step().back()?;
        self.step = previous;
        Some(previous)
    }

    /// Today's date in the `dd.mm.yyyy` form the fast path uses.
    pub fn date_today() -> String {
        chrono::Local::now().format("%d.%m.%Y").to_string()
    }

    /// Tomorrow's date in `dd.mm.yyyy`.
    pub fn date_tomorrow() -> String {
        (chrono::Local::now() + chrono::Duration::days(1))
            .format("%d.%m.%Y")
            .to_string()
    }

    /// Convert the fully filled form into an order-creation request.
    ///
    /// Fails with a validation error if any step other than the comment
    /// was never completed.
    pub fn confirm(&self, manager_id: i64) -> Result<NewOrder, BrigadirError> {
        self.expect_step(FormStep::Confirm)?;
        let missing = |field: &str| BrigadirError::Validation(format!("form field {field} is empty"));
        Ok(NewOrder {
            city: self.city.ok_or_else(|| missing("city"))?,
            address: self.address.clone().ok_or_else(|| missing("address"))?,
            date: self.date.clone().ok_or_else(|| missing("date"))?,
            time: self.time.clone().ok_or_else(|| missing("time"))?,
            cleaning_type: self
                .cleaning_type
                .clone()
                .ok_or_else(|| missing("cleaning_type"))?,
            equipment: self.equipment.clone().ok_or_else(|| missing("equipment"))?,
            conditions: self.conditions.clone().ok_or_else(|| missing("conditions"))?,
            comment: self.comment.clone().unwrap_or_default(),
            client_contact: self
                .client_contact
                .clone()
                .ok_or_else(|| missing("client_contact"))?,
            manager_contact: manager_id.to_string(),
            manager_id,
        })
    }
}
