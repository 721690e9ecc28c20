//! Static care task templates and the status interval matrix.

use crate::model::care_task::CareTaskKind;
use crate::model::tank::TankStatus;

/// Static definition of one recurring care task kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskTemplate {
    pub kind: CareTaskKind,
    pub title: &'static str,
    pub description: &'static str,
    /// Water parameter recorded on completion, set for `test_*` kinds only.
    pub measurement_parameter: Option<&'static str>,
}

impl TaskTemplate {
    pub fn requires_measurement(&self) -> bool {
        self.measurement_parameter.is_some()
    }
}

/// Template registry in canonical kind order.
pub const TASK_TEMPLATES: [TaskTemplate; 10] = [
    TaskTemplate {
        kind: CareTaskKind::Feeding,
        title: "Feed the fish",
        description: "Offer an amount of food the stock finishes within two minutes.",
        measurement_parameter: None,
    },
    TaskTemplate {
        kind: CareTaskKind::Observe,
        title: "Observe the tank",
        description: "Check behavior, breathing, fins and equipment for anything unusual.",
        measurement_parameter: None,
    },
    TaskTemplate {
        kind: CareTaskKind::WaterChange,
        title: "Partial water change",
        description: "Replace 20-30% of the water with conditioned water at tank temperature.",
        measurement_parameter: None,
    },
    TaskTemplate {
        kind: CareTaskKind::TestNo3,
        title: "Test nitrate (NO3)",
        description: "Measure nitrate; keep it below 40 mg/l.",
        measurement_parameter: Some("NO3"),
    },
    TaskTemplate {
        kind: CareTaskKind::TestNo2,
        title: "Test nitrite (NO2)",
        description: "Measure nitrite; any reading above 0.1 mg/l needs action.",
        measurement_parameter: Some("NO2"),
    },
    TaskTemplate {
        kind: CareTaskKind::TestPh,
        title: "Test pH",
        description: "Measure pH and compare it with the range of the stocked species.",
        measurement_parameter: Some("pH"),
    },
    TaskTemplate {
        kind: CareTaskKind::TestGh,
        title: "Test general hardness (GH)",
        description: "Measure general hardness in dGH.",
        measurement_parameter: Some("GH"),
    },
    TaskTemplate {
        kind: CareTaskKind::TestKh,
        title: "Test carbonate hardness (KH)",
        description: "Measure carbonate hardness in dKH to track pH buffering.",
        measurement_parameter: Some("KH"),
    },
    TaskTemplate {
        kind: CareTaskKind::TestTa,
        title: "Test total ammonia",
        description: "Measure total ammonia (NH3/NH4); any reading above 0 needs action.",
        measurement_parameter: Some("NH3"),
    },
    TaskTemplate {
        kind: CareTaskKind::TestCl2,
        title: "Test chlorine (Cl2)",
        description: "Measure chlorine after water changes; it must read 0.",
        measurement_parameter: Some("Cl2"),
    },
];

/// Returns the template of `kind`.
pub fn template_for(kind: CareTaskKind) -> &'static TaskTemplate {
    match kind {
        CareTaskKind::Feeding => &TASK_TEMPLATES[0],
        CareTaskKind::Observe => &TASK_TEMPLATES[1],
        CareTaskKind::WaterChange => &TASK_TEMPLATES[2],
        CareTaskKind::TestNo3 => &TASK_TEMPLATES[3],
        CareTaskKind::TestNo2 => &TASK_TEMPLATES[4],
        CareTaskKind::TestPh => &TASK_TEMPLATES[5],
        CareTaskKind::TestGh => &TASK_TEMPLATES[6],
        CareTaskKind::TestKh => &TASK_TEMPLATES[7],
        CareTaskKind::TestTa => &TASK_TEMPLATES[8],
        CareTaskKind::TestCl2 => &TASK_TEMPLATES[9],
    }
}

/// Interval in days of `kind` at tank `status`.
pub const fn interval_days(status: TankStatus, kind: CareTaskKind) -> u32 {
    // (comfort, elevated, critical)
    let (comfort, elevated, critical) = match kind {
        CareTaskKind::Feeding | CareTaskKind::Observe => (1, 1, 1),
        CareTaskKind::WaterChange => (14, 7, 3),
        CareTaskKind::TestNo3 => (14, 7, 3),
        CareTaskKind::TestNo2 => (7, 3, 1),
        CareTaskKind::TestPh => (7, 4, 2),
        CareTaskKind::TestGh => (30, 14, 7),
        CareTaskKind::TestKh => (30, 14, 7),
        CareTaskKind::TestTa => (7, 3, 1),
        CareTaskKind::TestCl2 => (30, 14, 7),
    };
    match status {
        TankStatus::Comfort => comfort,
        TankStatus::Elevated => elevated,
        TankStatus::Critical => critical,
    }
}

#[cfg(test)]
mod tests {
    use super::{interval_days, template_for, TASK_TEMPLATES};
    use crate::model::care_task::CareTaskKind;
    use crate::model::tank::TankStatus;

    #[test]
    fn registry_is_in_canonical_kind_order() {
        let kinds: Vec<CareTaskKind> = TASK_TEMPLATES.iter().map(|t| t.kind).collect();
        assert_eq!(kinds, CareTaskKind::ALL.to_vec());
        for kind in CareTaskKind::ALL {
            assert_eq!(template_for(kind).kind, kind);
        }
    }

    #[test]
    fn only_test_kinds_require_measurement() {
        for template in TASK_TEMPLATES {
            let is_test = template.kind.as_str().starts_with("test_");
            assert_eq!(template.requires_measurement(), is_test);
        }
    }

    #[test]
    fn intervals_never_grow_as_status_worsens() {
        for kind in CareTaskKind::ALL {
            let comfort = interval_days(TankStatus::Comfort, kind);
            let elevated = interval_days(TankStatus::Elevated, kind);
            let critical = interval_days(TankStatus::Critical, kind);
            assert!(comfort >= elevated && elevated >= critical, "{kind:?}");
            assert!(critical >= 1);
        }
    }

    #[test]
    fn water_change_and_daily_cadences() {
        assert_eq!(interval_days(TankStatus::Comfort, CareTaskKind::WaterChange), 14);
        assert_eq!(interval_days(TankStatus::Elevated, CareTaskKind::WaterChange), 7);
        assert_eq!(interval_days(TankStatus::Critical, CareTaskKind::WaterChange), 3);
        assert_eq!(interval_days(TankStatus::Critical, CareTaskKind::Feeding), 1);
        assert_eq!(interval_days(TankStatus::Comfort, CareTaskKind::Observe), 1);
    }
}
