use crate::app::AppState;
use crate::authz::{require_approved, Actor};
use crate::errors::AppResult;
use crate::models::dashboard::DashboardCounts;

pub async fn counts(state: &AppState, actor: &Actor) -> AppResult<DashboardCounts> {
    require_approved(actor)?;

    let (departments, projects, tasks) = tokio::try_join!(
        state.repo.count_departments(),
        state.repo.count_projects(),
        state.repo.count_tasks(),
    )?;

    Ok(DashboardCounts {
        departments,
        projects,
        tasks,
    })
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::authz::Role;
    use crate::db::Repository;
    use crate::models::department::Department;
    use crate::services::fakes::harness;
    use crate::utils::utc_now;

    #[tokio::test]
    async fn tallies_every_table() {
        let h = harness();
        for name in ["Estate", "Zoning"] {
            let department = Department {
                id: Uuid::new_v4(),
                name: name.to_string(),
                created_at: utc_now(),
            };
            h.repo.insert_department(&department).await.unwrap();
        }

        let actor = Actor::new("user_root", Role::Sysadmin);
        let counts = counts(&h.state, &actor).await.unwrap();
        assert_eq!(
            counts,
            DashboardCounts {
                departments: 2,
                projects: 0,
                tasks: 0
            }
        );
    }
}
