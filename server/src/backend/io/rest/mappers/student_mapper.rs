use crate::backend::domain::models::student::Student as DomainStudent;
use shared::Student as SharedStudent;

pub struct StudentMapper;

impl StudentMapper {
    pub fn to_dto(domain: DomainStudent) -> SharedStudent {
        SharedStudent {
            id: domain.id,
            matricule: domain.matricule,
            name: domain.name,
            email: domain.email,
        }
    }
}
