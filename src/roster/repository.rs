//! Roster repository for student and bus database operations.

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::{debug, instrument};

use super::models::{Bus, BusWithDriver, CreateBusRequest, CreateStudentRequest, Student, UpdateStudentRequest};

/// Repository for the roster tables (students and buses).
#[derive(Debug, Clone)]
pub struct RosterRepository {
    pool: SqlitePool,
}

impl RosterRepository {
    /// Create a new roster repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn generate_student_id() -> String {
        format!("stu_{}", nanoid::nanoid!(12))
    }

    fn generate_bus_id() -> String {
        format!("bus_{}", nanoid::nanoid!(12))
    }

    /// Insert a new student for a school.
    #[instrument(skip(self, request))]
    pub async fn create_student(
        &self,
        school_id: &str,
        request: &CreateStudentRequest,
    ) -> Result<Student> {
        let id = Self::generate_student_id();
        debug!("Creating student {} for school {}", id, school_id);

        sqlx::query(
            r#"
            INSERT INTO students (id, school_id, name, class, roll, address, bus, student_code)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(school_id)
        .bind(&request.name)
        .bind(&request.class)
        .bind(&request.roll)
        .bind(&request.address)
        .bind(&request.bus)
        .bind(&request.student_code)
        .execute(&self.pool)
        .await
        .context("Failed to insert student")?;

        self.get_student(school_id, &id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Student not found after creation"))
    }

    /// Get a student by ID, scoped to the owning school.
    #[instrument(skip(self))]
    pub async fn get_student(&self, school_id: &str, id: &str) -> Result<Option<Student>> {
        let student = sqlx::query_as::<_, Student>(
            r#"
            SELECT id, school_id, name, class, roll, address, bus, student_code,
                   created_at, updated_at
            FROM students
            WHERE id = ? AND school_id = ?
            "#,
        )
        .bind(id)
        .bind(school_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch student")?;

        Ok(student)
    }

    /// List all students belonging to a school.
    #[instrument(skip(self))]
    pub async fn list_students(&self, school_id: &str) -> Result<Vec<Student>> {
        let students = sqlx::query_as::<_, Student>(
            r#"
            SELECT id, school_id, name, class, roll, address, bus, student_code,
                   created_at, updated_at
            FROM students
            WHERE school_id = ?
            ORDER BY created_at DESC
            "#,
        )
        .bind(school_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list students")?;

        Ok(students)
    }

    /// Apply a partial update to a student. Returns the updated row, or
    /// `None` when the student does not exist for this school.
    #[instrument(skip(self, request))]
    pub async fn update_student(
        &self,
        school_id: &str,
        id: &str,
        request: &UpdateStudentRequest,
    ) -> Result<Option<Student>> {
        let mut sets: Vec<&str> = Vec::new();
        let mut values: Vec<&str> = Vec::new();

        if let Some(name) = &request.name {
            sets.push("name = ?");
            values.push(name);
        }
        if let Some(class) = &request.class {
            sets.push("class = ?");
            values.push(class);
        }
        if let Some(roll) = &request.roll {
            sets.push("roll = ?");
            values.push(roll);
        }
        if let Some(address) = &request.address {
            sets.push("address = ?");
            values.push(address);
        }
        if let Some(bus) = &request.bus {
            sets.push("bus = ?");
            values.push(bus);
        }
        if let Some(student_code) = &request.student_code {
            sets.push("student_code = ?");
            values.push(student_code);
        }

        if !sets.is_empty() {
            sets.push("updated_at = datetime('now')");
            let sql = format!(
                "UPDATE students SET {} WHERE id = ? AND school_id = ?",
                sets.join(", ")
            );

            let mut query = sqlx::query(&sql);
            for value in values {
                query = query.bind(value);
            }
            query
                .bind(id)
                .bind(school_id)
                .execute(&self.pool)
                .await
                .context("Failed to update student")?;
        }

        self.get_student(school_id, id).await
    }

    /// Delete a student. Returns the deleted row so callers can adjust
    /// the bus headcount, or `None` when no such student exists.
    #[instrument(skip(self))]
    pub async fn delete_student(&self, school_id: &str, id: &str) -> Result<Option<Student>> {
        let Some(student) = self.get_student(school_id, id).await? else {
            return Ok(None);
        };

        sqlx::query("DELETE FROM students WHERE id = ? AND school_id = ?")
            .bind(id)
            .bind(school_id)
            .execute(&self.pool)
            .await
            .context("Failed to delete student")?;

        Ok(Some(student))
    }

    /// Insert a new bus for a school.
    #[instrument(skip(self, request))]
    pub async fn create_bus(&self, school_id: &str, request: &CreateBusRequest) -> Result<Bus> {
        let id = Self::generate_bus_id();
        debug!("Creating bus {} for school {}", id, school_id);

        sqlx::query(
            r#"
            INSERT INTO buses (id, school_id, bus_number, car_number, route, capacity)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(school_id)
        .bind(&request.bus_number)
        .bind(&request.car_number)
        .bind(&request.route)
        .bind(request.capacity)
        .execute(&self.pool)
        .await
        .context("Failed to insert bus")?;

        self.get_bus(school_id, &id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Bus not found after creation"))
    }

    /// Get a bus by ID, scoped to the owning school.
    #[instrument(skip(self))]
    pub async fn get_bus(&self, school_id: &str, id: &str) -> Result<Option<Bus>> {
        let bus = sqlx::query_as::<_, Bus>(
            r#"
            SELECT id, school_id, bus_number, car_number, driver_id, route,
                   capacity, student_count, created_at, updated_at
            FROM buses
            WHERE id = ? AND school_id = ?
            "#,
        )
        .bind(id)
        .bind(school_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch bus")?;

        Ok(bus)
    }

    /// List all buses for a school, joined with assigned driver names.
    #[instrument(skip(self))]
    pub async fn list_buses(&self, school_id: &str) -> Result<Vec<BusWithDriver>> {
        let buses = sqlx::query_as::<_, BusWithDriver>(
            r#"
            SELECT b.id, b.school_id, b.bus_number, b.car_number, b.driver_id,
                   b.route, b.capacity, b.student_count, b.created_at, b.updated_at,
                   d.full_name AS driver_name
            FROM buses b
            LEFT JOIN drivers d ON d.id = b.driver_id
            WHERE b.school_id = ?
            ORDER BY b.created_at DESC
            "#,
        )
        .bind(school_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list buses")?;

        Ok(buses)
    }

    /// Set the assigned driver on a bus.
    #[instrument(skip(self))]
    pub async fn set_bus_driver(&self, school_id: &str, bus_id: &str, driver_id: &str) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE buses
            SET driver_id = ?, updated_at = datetime('now')
            WHERE id = ? AND school_id = ?
            "#,
        )
        .bind(driver_id)
        .bind(bus_id)
        .bind(school_id)
        .execute(&self.pool)
        .await
        .context("Failed to assign driver")?;

        Ok(())
    }

    /// Adjust a bus headcount by `delta`, clamping at zero. Buses are
    /// addressed by number because students store the bus number, not
    /// the bus ID. Missing buses are ignored.
    #[instrument(skip(self))]
    pub async fn adjust_student_count(
        &self,
        school_id: &str,
        bus_number: &str,
        delta: i64,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE buses
            SET student_count = MAX(0, student_count + ?),
                updated_at = datetime('now')
            WHERE school_id = ? AND bus_number = ?
            "#,
        )
        .bind(delta)
        .bind(school_id)
        .bind(bus_number)
        .execute(&self.pool)
        .await
        .context("Failed to adjust bus student count")?;

        Ok(())
    }
}
