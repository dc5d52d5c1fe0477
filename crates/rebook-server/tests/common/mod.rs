#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use rebook_server::domain::{
    Appointment, AppointmentStatus, Business, Customer, NewVisit, Visit,
};
use rebook_server::error::{AppError, Result};
use rebook_server::gateway::{GatewayError, MessagingGateway};
use rebook_server::repo::{ReminderCandidate, Repository, WinbackCandidate};

/// In-memory stand-in for the Postgres repository. Mirrors the conditional
/// write semantics of the SQL implementation so the dispatcher tests
/// exercise the same idempotency rules.
#[derive(Default)]
pub struct MemoryRepository {
    inner: Mutex<Store>,
}

#[derive(Default)]
struct Store {
    businesses: HashMap<Uuid, Business>,
    customers: HashMap<Uuid, Customer>,
    appointments: HashMap<Uuid, Appointment>,
    visits: Vec<Visit>,
}

impl MemoryRepository {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn insert_business(&self, business: Business) -> Result<Business> {
        let mut store = self.inner.lock().unwrap();
        store.businesses.insert(business.id, business.clone());
        Ok(business)
    }

    async fn find_business(&self, id: Uuid) -> Result<Option<Business>> {
        Ok(self.inner.lock().unwrap().businesses.get(&id).cloned())
    }

    async fn find_business_by_owner(&self, owner_id: &str) -> Result<Option<Business>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .businesses
            .values()
            .find(|b| b.owner_id == owner_id)
            .cloned())
    }

    async fn list_businesses(&self) -> Result<Vec<Business>> {
        let mut businesses: Vec<Business> =
            self.inner.lock().unwrap().businesses.values().cloned().collect();
        businesses.sort_by_key(|b| b.created_at);
        Ok(businesses)
    }

    async fn update_business_settings(
        &self,
        id: Uuid,
        name: Option<String>,
        review_link: Option<String>,
    ) -> Result<Option<Business>> {
        let mut store = self.inner.lock().unwrap();
        let Some(business) = store.businesses.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = name {
            business.name = name;
        }
        if let Some(review_link) = review_link {
            business.review_link = Some(review_link);
        }
        Ok(Some(business.clone()))
    }

    async fn insert_customer(&self, customer: Customer) -> Result<Customer> {
        let mut store = self.inner.lock().unwrap();
        store.customers.insert(customer.id, customer.clone());
        Ok(customer)
    }

    async fn find_customer(&self, id: Uuid) -> Result<Option<Customer>> {
        Ok(self.inner.lock().unwrap().customers.get(&id).cloned())
    }

    async fn list_customers(&self, business_id: Uuid) -> Result<Vec<Customer>> {
        let mut customers: Vec<Customer> = self
            .inner
            .lock()
            .unwrap()
            .customers
            .values()
            .filter(|c| c.business_id == business_id)
            .cloned()
            .collect();
        customers.sort_by_key(|c| c.created_at);
        Ok(customers)
    }

    async fn stamp_last_visit(&self, customer_id: Uuid, at: DateTime<Utc>) -> Result<()> {
        let mut store = self.inner.lock().unwrap();
        if let Some(customer) = store.customers.get_mut(&customer_id) {
            customer.last_visit_at = Some(at);
        }
        Ok(())
    }

    async fn winback_candidates(
        &self,
        lapsed_before: DateTime<Utc>,
        cooled_before: DateTime<Utc>,
    ) -> Result<Vec<WinbackCandidate>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .customers
            .values()
            .filter(|c| {
                c.marketing_opt_in
                    && c.last_visit_at.is_some_and(|t| t < lapsed_before)
                    && c.last_winback_sent_at.is_none_or(|t| t < cooled_before)
            })
            .map(|c| WinbackCandidate {
                customer_id: c.id,
                business_id: c.business_id,
                name: c.name.clone(),
                phone: c.phone.clone(),
            })
            .collect())
    }

    async fn mark_winback_sent(&self, customer_id: Uuid, at: DateTime<Utc>) -> Result<bool> {
        let mut store = self.inner.lock().unwrap();
        let Some(customer) = store.customers.get_mut(&customer_id) else {
            return Ok(false);
        };
        if customer.last_winback_sent_at.is_some_and(|t| t > at) {
            return Ok(false);
        }
        customer.last_winback_sent_at = Some(at);
        Ok(true)
    }

    async fn count_lapsed(
        &self,
        business_id: Uuid,
        lapsed_before: DateTime<Utc>,
    ) -> Result<u64> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .customers
            .values()
            .filter(|c| {
                c.business_id == business_id
                    && c.last_visit_at.is_some_and(|t| t < lapsed_before)
            })
            .count() as u64)
    }

    async fn count_winbacks_since(&self, business_id: Uuid, since: DateTime<Utc>) -> Result<u64> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .customers
            .values()
            .filter(|c| {
                c.business_id == business_id
                    && c.last_winback_sent_at.is_some_and(|t| t >= since)
            })
            .count() as u64)
    }

    async fn insert_appointment(&self, appointment: Appointment) -> Result<Appointment> {
        let mut store = self.inner.lock().unwrap();
        store.appointments.insert(appointment.id, appointment.clone());
        Ok(appointment)
    }

    async fn find_appointment(&self, id: Uuid) -> Result<Option<Appointment>> {
        Ok(self.inner.lock().unwrap().appointments.get(&id).cloned())
    }

    async fn appointments_started_since(
        &self,
        business_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Vec<Appointment>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .appointments
            .values()
            .filter(|a| a.business_id == business_id && a.start_time >= since)
            .cloned()
            .collect())
    }

    async fn reminder_candidates(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<ReminderCandidate>> {
        let store = self.inner.lock().unwrap();
        let mut candidates: Vec<ReminderCandidate> = store
            .appointments
            .values()
            .filter(|a| {
                a.status == AppointmentStatus::Confirmed
                    && !a.reminder_sent
                    && a.start_time >= from
                    && a.start_time < until
            })
            .filter_map(|a| {
                let customer = store.customers.get(&a.customer_id)?;
                let business = store.businesses.get(&a.business_id)?;
                Some(ReminderCandidate {
                    appointment_id: a.id,
                    start_time: a.start_time,
                    customer_name: customer.name.clone(),
                    customer_phone: customer.phone.clone(),
                    business_name: business.name.clone(),
                })
            })
            .collect();
        candidates.sort_by_key(|c| c.start_time);
        Ok(candidates)
    }

    async fn mark_reminder_sent(&self, appointment_id: Uuid) -> Result<bool> {
        let mut store = self.inner.lock().unwrap();
        let Some(appointment) = store.appointments.get_mut(&appointment_id) else {
            return Ok(false);
        };
        if appointment.status != AppointmentStatus::Confirmed || appointment.reminder_sent {
            return Ok(false);
        }
        appointment.reminder_sent = true;
        Ok(true)
    }

    async fn transition_appointment(
        &self,
        id: Uuid,
        to: AppointmentStatus,
    ) -> Result<Appointment> {
        let mut store = self.inner.lock().unwrap();
        let Some(appointment) = store.appointments.get_mut(&id) else {
            return Err(AppError::AppointmentNotFound(id));
        };
        if !appointment.status.can_transition_to(to) {
            return Err(AppError::InvalidTransition {
                from: appointment.status,
                to,
            });
        }
        appointment.status = to;
        Ok(appointment.clone())
    }

    async fn reschedule_appointment(
        &self,
        id: Uuid,
        new_time: DateTime<Utc>,
    ) -> Result<Appointment> {
        let mut store = self.inner.lock().unwrap();
        let Some(appointment) = store.appointments.get_mut(&id) else {
            return Err(AppError::AppointmentNotFound(id));
        };
        if !appointment
            .status
            .can_transition_to(AppointmentStatus::Confirmed)
        {
            return Err(AppError::InvalidTransition {
                from: appointment.status,
                to: AppointmentStatus::Confirmed,
            });
        }
        appointment.start_time = new_time;
        appointment.status = AppointmentStatus::Confirmed;
        appointment.reminder_sent = false;
        Ok(appointment.clone())
    }

    async fn insert_visit(&self, visit: NewVisit) -> Result<Visit> {
        let mut store = self.inner.lock().unwrap();
        let visit = Visit {
            id: Uuid::new_v4(),
            appointment_id: visit.appointment_id,
            rating: visit.rating,
            feedback: visit.feedback,
            created_at: Utc::now(),
        };
        store.visits.push(visit.clone());
        Ok(visit)
    }

    async fn visits_for_appointments(&self, appointment_ids: &[Uuid]) -> Result<Vec<Visit>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .visits
            .iter()
            .filter(|v| appointment_ids.contains(&v.appointment_id))
            .cloned()
            .collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub to: String,
    pub template: String,
    pub params: Vec<String>,
}

/// Recording gateway: collects sends, fails selected numbers, optionally
/// stalls to exercise the per-item deadline.
#[derive(Default)]
pub struct FakeGateway {
    sent: Mutex<Vec<SentMessage>>,
    failing: Mutex<Vec<String>>,
    stall: Mutex<Option<Duration>>,
}

impl FakeGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_for(&self, phone: &str) {
        self.failing.lock().unwrap().push(phone.to_string());
    }

    pub fn clear_failures(&self) {
        self.failing.lock().unwrap().clear();
    }

    pub fn stall_for(&self, delay: Duration) {
        *self.stall.lock().unwrap() = Some(delay);
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessagingGateway for FakeGateway {
    async fn send_template(
        &self,
        to_phone: &str,
        template: &str,
        params: &[String],
    ) -> std::result::Result<(), GatewayError> {
        let stall = *self.stall.lock().unwrap();
        if let Some(delay) = stall {
            tokio::time::sleep(delay).await;
        }

        if self.failing.lock().unwrap().iter().any(|p| p == to_phone) {
            return Err(GatewayError::Rejected("simulated provider failure".into()));
        }

        self.sent.lock().unwrap().push(SentMessage {
            to: to_phone.to_string(),
            template: template.to_string(),
            params: params.to_vec(),
        });
        Ok(())
    }
}

pub fn business(name: &str) -> Business {
    Business {
        id: Uuid::new_v4(),
        owner_id: format!("owner-{}", Uuid::new_v4()),
        name: name.into(),
        review_link: Some("https://g.page/r/example-review".into()),
        timezone: "UTC".into(),
        created_at: Utc::now(),
    }
}

pub fn customer(business_id: Uuid, name: &str, phone: &str) -> Customer {
    Customer {
        id: Uuid::new_v4(),
        business_id,
        name: name.into(),
        phone: phone.into(),
        email: None,
        marketing_opt_in: true,
        last_visit_at: None,
        last_winback_sent_at: None,
        created_at: Utc::now(),
    }
}

pub fn confirmed_appointment(
    business_id: Uuid,
    customer_id: Uuid,
    start_time: DateTime<Utc>,
) -> Appointment {
    Appointment {
        id: Uuid::new_v4(),
        business_id,
        customer_id,
        start_time,
        status: AppointmentStatus::Confirmed,
        reminder_sent: false,
        created_at: Utc::now(),
    }
}
