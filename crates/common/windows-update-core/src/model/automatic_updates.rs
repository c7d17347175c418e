use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::codec;
use crate::enums::{AutomaticUpdatesNotificationLevel, AutomaticUpdatesScheduledInstallationDay};
use crate::error::{UpdateAgentError, UpdateResult};
use crate::materialize::{Context, FromDispatch};
use crate::value::ObjectRef;

/// Automatic Updates configuration.
///
/// Unlike most snapshots this one is writable: the setters write through to
/// the agent and only update the local field once the write succeeded.
/// [`AutomaticUpdatesSettings::save`] persists pending writes.
#[derive(Debug, Clone, Serialize)]
pub struct AutomaticUpdatesSettings {
    #[serde(skip)]
    disp: ObjectRef,
    pub notification_level: i32,
    pub read_only: bool,
    pub required: bool,
    /// Ignored by the agent on Windows 8 and later.
    pub scheduled_installation_day: i32,
    /// Hour of the day, `0..=23`. Ignored by the agent on Windows 8 and later.
    pub scheduled_installation_time: i32,
}

impl FromDispatch for AutomaticUpdatesSettings {
    fn from_dispatch_in(disp: &ObjectRef, _cx: &Context) -> UpdateResult<Self> {
        Ok(Self {
            disp: disp.clone(),
            notification_level: codec::to_i32(disp.get_property("NotificationLevel"))?,
            read_only: codec::to_bool(disp.get_property("ReadOnly"))?,
            required: codec::to_bool(disp.get_property("Required"))?,
            scheduled_installation_day: codec::to_i32(
                disp.get_property("ScheduledInstallationDay"),
            )?,
            scheduled_installation_time: codec::to_i32(
                disp.get_property("ScheduledInstallationTime"),
            )?,
        })
    }
}

impl AutomaticUpdatesSettings {
    #[must_use]
    pub fn notification_level(&self) -> Option<AutomaticUpdatesNotificationLevel> {
        AutomaticUpdatesNotificationLevel::from_code(self.notification_level)
    }

    #[must_use]
    pub fn scheduled_installation_day(&self) -> Option<AutomaticUpdatesScheduledInstallationDay> {
        AutomaticUpdatesScheduledInstallationDay::from_code(self.scheduled_installation_day)
    }

    /// Re-reads the settings from the registry, then refreshes every field.
    #[instrument(skip(self))]
    pub fn refresh(&mut self) -> UpdateResult<()> {
        self.disp.call_method("Refresh", &[])?;
        *self = Self::from_dispatch(&self.disp)?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub fn save(&self) -> UpdateResult<()> {
        self.disp.call_method("Save", &[])?;
        debug!("Automatic Updates settings saved");
        Ok(())
    }

    pub fn set_notification_level(
        &mut self,
        level: AutomaticUpdatesNotificationLevel,
    ) -> UpdateResult<()> {
        self.disp.put_property("NotificationLevel", level)?;
        self.notification_level = level.code();
        Ok(())
    }

    pub fn set_scheduled_installation_day(
        &mut self,
        day: AutomaticUpdatesScheduledInstallationDay,
    ) -> UpdateResult<()> {
        self.disp.put_property("ScheduledInstallationDay", day)?;
        self.scheduled_installation_day = day.code();
        Ok(())
    }

    pub fn set_scheduled_installation_time(&mut self, hour: i32) -> UpdateResult<()> {
        if !(0..=23).contains(&hour) {
            return Err(UpdateAgentError::invalid_config(format!(
                "scheduled installation hour {hour} is outside 0..=23"
            )));
        }
        self.disp.put_property("ScheduledInstallationTime", hour)?;
        self.scheduled_installation_time = hour;
        Ok(())
    }
}

/// Dates of the last successful Automatic Updates search and installation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct AutomaticUpdatesResults {
    pub last_installation_success_date: Option<DateTime<Utc>>,
    pub last_search_success_date: Option<DateTime<Utc>>,
}

impl FromDispatch for AutomaticUpdatesResults {
    fn from_dispatch_in(disp: &ObjectRef, _cx: &Context) -> UpdateResult<Self> {
        Ok(Self {
            last_installation_success_date: codec::to_timestamp(
                disp.get_property("LastInstallationSuccessDate"),
            )?,
            last_search_success_date: codec::to_timestamp(
                disp.get_property("LastSearchSuccessDate"),
            )?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{CallKind, MemoryObject};
    use crate::value::Value;

    fn settings() -> MemoryObject {
        MemoryObject::new("Settings")
            .with_property("NotificationLevel", 2)
            .with_property("ReadOnly", false)
            .with_property("Required", false)
            .with_property("ScheduledInstallationDay", 0)
            .with_property("ScheduledInstallationTime", 3)
            .with_method_value("Refresh", Value::Null)
            .with_method_value("Save", Value::Null)
    }

    #[test]
    fn setters_update_cache_after_success() {
        let obj = settings();
        let log = obj.log();
        let mut settings = AutomaticUpdatesSettings::from_dispatch(&obj.into_ref()).unwrap();
        settings
            .set_notification_level(AutomaticUpdatesNotificationLevel::ScheduledInstallation)
            .unwrap();
        settings
            .set_scheduled_installation_day(AutomaticUpdatesScheduledInstallationDay::EveryFriday)
            .unwrap();
        settings.set_scheduled_installation_time(22).unwrap();
        settings.save().unwrap();

        assert_eq!(
            settings.notification_level(),
            Some(AutomaticUpdatesNotificationLevel::ScheduledInstallation)
        );
        assert_eq!(settings.scheduled_installation_day, 6);
        assert_eq!(settings.scheduled_installation_time, 22);
        assert_eq!(log.last("NotificationLevel").unwrap().args, vec![Value::I32(4)]);
        assert_eq!(log.count("Save"), 1);
    }

    #[test]
    fn failed_write_keeps_cached_value() {
        let disp = settings()
            .with_put_error("NotificationLevel", "access denied")
            .into_ref();
        let mut settings = AutomaticUpdatesSettings::from_dispatch(&disp).unwrap();
        assert!(
            settings
                .set_notification_level(AutomaticUpdatesNotificationLevel::Disabled)
                .is_err()
        );
        assert_eq!(settings.notification_level, 2);
    }

    #[test]
    fn out_of_range_hour_is_rejected_locally() {
        let obj = settings();
        let log = obj.log();
        let mut settings = AutomaticUpdatesSettings::from_dispatch(&obj.into_ref()).unwrap();
        assert!(matches!(
            settings.set_scheduled_installation_time(24),
            Err(UpdateAgentError::InvalidConfig { .. })
        ));
        assert_eq!(
            log.last("ScheduledInstallationTime").unwrap().kind,
            CallKind::Get
        );
    }

    #[test]
    fn refresh_rereads_every_field() {
        let disp = settings().into_ref();
        let mut settings = AutomaticUpdatesSettings::from_dispatch(&disp).unwrap();
        disp.put_property("Required", true).unwrap();
        settings.refresh().unwrap();
        assert!(settings.required);
    }
}
